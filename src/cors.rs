use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;

/// Adds CORS headers so the dev frontend (a separate origin during
/// development) can call the API. Only configured origins are echoed back.
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Cors { allowed_origins }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if let Some(origin) = req.headers().get_one("Origin") {
            if self.allowed_origins.iter().any(|o| o == origin) {
                res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
                res.set_header(Header::new("Vary", "Origin"));
            }
        }
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Origin, Content-Type, Authorization",
        ));
    }
}

/// Answers preflight requests for any path; the fairing adds the headers.
#[options("/<_..>")]
pub fn preflight() {}
