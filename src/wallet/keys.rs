//! Address generation and QR payloads for new wallets.

use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::QrCode;
use rand::RngCore;

use crate::error::{EcoError, EcoResult};

/// `0x` + 40 lowercase hex characters from 20 random bytes.
pub fn generate_address() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

/// SVG QR code of `payload` as a `data:` URL, stored in `wallets.qr_code`.
pub fn qr_data_url(payload: &str) -> EcoResult<String> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| EcoError::Qr(e.to_string()))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}
