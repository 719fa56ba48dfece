use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::{Config, FRONTEND_DIR};

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about a missing frontend bundle, and
/// aborts if a required directory cannot be created or written to.
pub fn run(config: &Config) {
    info!("Boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Required directories ────────────────────────
    let db_dir = Path::new(&config.db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf());

    let mut required: Vec<&Path> = vec![Path::new(&config.upload_dir), Path::new(FRONTEND_DIR)];
    if let Some(ref dir) = db_dir {
        required.push(dir);
    }

    for dir in &required {
        if !dir.exists() {
            match fs::create_dir_all(dir) {
                Ok(_) => info!("  Created directory: {}", dir.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir.display(), e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Upload directory writable ───────────────────
    let uploads = Path::new(&config.upload_dir);
    if uploads.exists() {
        let test_file = uploads.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Upload directory not writable: {} (uploads will fail)", e);
                errors += 1;
            }
        }
    }

    // ── 3. Database directory writable ─────────────────
    if let Some(dir) = db_dir {
        if dir.exists() {
            let test_file = dir.join(".write_test");
            match fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = fs::remove_file(&test_file);
                }
                Err(e) => {
                    error!("  Database directory not writable: {}", e);
                    errors += 1;
                }
            }
        }
    }

    // ── 4. Frontend bundle present ─────────────────────
    if !Path::new(FRONTEND_DIR).join("index.html").exists() {
        warn!(
            "  No frontend bundle at {}/index.html (the API works but the UI will 404)",
            FRONTEND_DIR
        );
        warnings += 1;
    }

    // ── 5. Rocket.toml exists ──────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found — using default config");
        warnings += 1;
    }

    // ── Summary ────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!("Boot check passed with {} warning(s).", warnings);
    } else {
        info!("Boot check passed. All systems go.");
    }
}
