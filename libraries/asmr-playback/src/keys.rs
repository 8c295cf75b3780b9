//! Keyboard shortcuts

/// Keys the player reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    F,
    Escape,
    Space,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "f" | "F" => Key::F,
            "Escape" | "Esc" => Key::Escape,
            " " | "Spacebar" => Key::Space,
            _ => Key::Other,
        }
    }
}

/// Action a key press maps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    /// Relative seek in seconds
    Seek(f64),
    ToggleFullscreen,
    ExitFullscreen,
    TogglePlay,
}

/// Resolve a key press; `None` means the event is not ours
///
/// Nothing is handled while a text field has focus, so typing a space or
/// an `f` in a search box does not drive the player.
pub fn command_for(
    key: Key,
    is_fullscreen: bool,
    in_text_field: bool,
    seek_step_secs: f64,
) -> Option<KeyCommand> {
    if in_text_field {
        return None;
    }
    match key {
        Key::ArrowLeft => Some(KeyCommand::Seek(-seek_step_secs)),
        Key::ArrowRight => Some(KeyCommand::Seek(seek_step_secs)),
        Key::F => Some(KeyCommand::ToggleFullscreen),
        Key::Escape if is_fullscreen => Some(KeyCommand::ExitFullscreen),
        Key::Space => Some(KeyCommand::TogglePlay),
        Key::Escape | Key::Other => None,
    }
}

/// Whether an element accepts typed text
///
/// `tag` is the element's tag name (any case), `input_type` the `type`
/// attribute for `<input>`.
pub fn is_text_entry(tag: &str, input_type: Option<&str>, content_editable: bool) -> bool {
    if content_editable {
        return true;
    }
    match tag.to_ascii_lowercase().as_str() {
        "textarea" | "select" => true,
        "input" => !matches!(
            input_type
                .map(str::to_ascii_lowercase)
                .as_deref(),
            Some(
                "button"
                    | "checkbox"
                    | "radio"
                    | "range"
                    | "submit"
                    | "reset"
                    | "color"
                    | "file"
                    | "image"
            )
        ),
        _ => false,
    }
}
