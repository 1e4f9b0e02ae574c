//! Share link generation and clipboard access.

/// Build the shareable URL for a room.
pub fn share_link(base_url: &str, room_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/?room={room_id}")
}

/// Copy text to the system clipboard. Returns whether the copy
/// succeeded; failure is logged, never fatal.
#[cfg(not(target_arch = "wasm32"))]
pub fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("clipboard write failed: {err}");
                false
            }
        },
        Err(err) => {
            log::warn!("clipboard unavailable: {err}");
            false
        }
    }
}

/// On wasm the host page owns the clipboard (navigator.clipboard); the
/// core cannot reach it directly.
#[cfg(target_arch = "wasm32")]
pub fn copy_to_clipboard(_text: &str) -> bool {
    log::warn!("clipboard access is handled by the host on wasm");
    false
}

/// Copy a room's share link to the clipboard.
pub fn copy_share_link(base_url: &str, room_id: &str) -> bool {
    copy_to_clipboard(&share_link(base_url, room_id))
}
