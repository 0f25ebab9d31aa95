use base64::Engine;
use std::time::Duration;

/// Human readable byte count: `512 B`, `1.5 KB`, `3.2 MB`, `1.0 GB`.
pub fn format_size(size_bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let size = size_bytes as f64;

    if size_bytes < 1024 {
        format!("{} B", size_bytes)
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else if size < KB * KB * KB {
        format!("{:.1} MB", size / (KB * KB))
    } else {
        format!("{:.1} GB", size / (KB * KB * KB))
    }
}

/// Delay as shown to users: whole minutes when it divides evenly.
pub fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}

/// Short URL-safe token for share links: 9 random bytes, 12 characters.
pub fn generate_link_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..9).map(|_| rng.r#gen()).collect();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
}

/// Identifier shown to the user for an upload session.
pub fn generate_session_id() -> String {
    generate_link_code()
}

/// Zero-padded serial tag used in captions and listings.
pub fn serial_tag(serial_number: i32) -> String {
    format!("#{:03}", serial_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(10 * 1024 * 1024 * 1024), "10.0 GB");
    }

    #[test]
    fn test_format_delay() {
        assert_eq!(format_delay(Duration::from_secs(600)), "10 minutes");
        assert_eq!(format_delay(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_delay(Duration::from_secs(90)), "90 seconds");
        assert_eq!(format_delay(Duration::from_secs(5)), "5 seconds");
    }

    #[test]
    fn test_link_code_shape() {
        let code = generate_link_code();
        assert_eq!(code.len(), 12);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(code, generate_link_code());
    }

    #[test]
    fn test_serial_tag_padding() {
        assert_eq!(serial_tag(1), "#001");
        assert_eq!(serial_tag(42), "#042");
        assert_eq!(serial_tag(1234), "#1234");
    }
}
