//! `textcha` - challenge-image generator demo.
//!
//! Copyright (C) 2026 Maverick
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Loads the rendering configuration from the environment, renders a
//! random challenge string, and writes the encoded image to disk.

use rand::Rng;
use textcha::{CaptchaEngine, RenderConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const CHALLENGE_LENGTH: usize = 4;

fn main() {
    dotenvy::dotenv().ok();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    let config = RenderConfig::from_env();
    let engine = match CaptchaEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut rng = rand::rng();
    let text: String = (0..CHALLENGE_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "challenge.png".to_string());

    match engine.generate(&text, &mut rng) {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(&output, &bytes) {
                eprintln!("failed to write {output}: {e}");
                std::process::exit(1);
            }
            info!(text = %text, output = %output, bytes = bytes.len(), "challenge image written");
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
