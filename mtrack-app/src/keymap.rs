use mtrack_core::KeyCode;
use winit::keyboard::KeyCode as Physical;

/// Maps a physical key to its legacy DOM keycode so configured codes
/// (`F` = 70, `J` = 74, ...) keep their familiar values.
pub fn legacy_keycode(key: Physical) -> Option<KeyCode> {
    let code = match key {
        Physical::KeyA => 65,
        Physical::KeyB => 66,
        Physical::KeyC => 67,
        Physical::KeyD => 68,
        Physical::KeyE => 69,
        Physical::KeyF => 70,
        Physical::KeyG => 71,
        Physical::KeyH => 72,
        Physical::KeyI => 73,
        Physical::KeyJ => 74,
        Physical::KeyK => 75,
        Physical::KeyL => 76,
        Physical::KeyM => 77,
        Physical::KeyN => 78,
        Physical::KeyO => 79,
        Physical::KeyP => 80,
        Physical::KeyQ => 81,
        Physical::KeyR => 82,
        Physical::KeyS => 83,
        Physical::KeyT => 84,
        Physical::KeyU => 85,
        Physical::KeyV => 86,
        Physical::KeyW => 87,
        Physical::KeyX => 88,
        Physical::KeyY => 89,
        Physical::KeyZ => 90,
        Physical::Digit0 => 48,
        Physical::Digit1 => 49,
        Physical::Digit2 => 50,
        Physical::Digit3 => 51,
        Physical::Digit4 => 52,
        Physical::Digit5 => 53,
        Physical::Digit6 => 54,
        Physical::Digit7 => 55,
        Physical::Digit8 => 56,
        Physical::Digit9 => 57,
        Physical::Numpad0 => 96,
        Physical::Numpad1 => 97,
        Physical::Numpad2 => 98,
        Physical::Numpad3 => 99,
        Physical::Numpad4 => 100,
        Physical::Numpad5 => 101,
        Physical::Numpad6 => 102,
        Physical::Numpad7 => 103,
        Physical::Numpad8 => 104,
        Physical::Numpad9 => 105,
        Physical::F1 => 112,
        Physical::F2 => 113,
        Physical::F3 => 114,
        Physical::F4 => 115,
        Physical::F5 => 116,
        Physical::F6 => 117,
        Physical::F7 => 118,
        Physical::F8 => 119,
        Physical::F9 => 120,
        Physical::F10 => 121,
        Physical::F11 => 122,
        Physical::F12 => 123,
        Physical::Backspace => 8,
        Physical::Tab => 9,
        Physical::Enter | Physical::NumpadEnter => 13,
        Physical::ShiftLeft | Physical::ShiftRight => 16,
        Physical::ControlLeft | Physical::ControlRight => 17,
        Physical::AltLeft | Physical::AltRight => 18,
        Physical::CapsLock => 20,
        Physical::Escape => 27,
        Physical::Space => 32,
        Physical::PageUp => 33,
        Physical::PageDown => 34,
        Physical::End => 35,
        Physical::Home => 36,
        Physical::ArrowLeft => 37,
        Physical::ArrowUp => 38,
        Physical::ArrowRight => 39,
        Physical::ArrowDown => 40,
        Physical::Insert => 45,
        Physical::Delete => 46,
        Physical::Semicolon => 186,
        Physical::Equal => 187,
        Physical::Comma => 188,
        Physical::Minus => 189,
        Physical::Period => 190,
        Physical::Slash => 191,
        Physical::Backquote => 192,
        Physical::BracketLeft => 219,
        Physical::Backslash => 220,
        Physical::BracketRight => 221,
        Physical::Quote => 222,
        _ => return None,
    };
    Some(KeyCode(code))
}
