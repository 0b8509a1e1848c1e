//! Translation between replica keys and the rdev / enigo key types.

use replica_core::Key;

/// Map an rdev key to a tracked key.
///
/// rdev reports left Alt as `Alt` and right Alt as `AltGr`. Keys rdev does
/// not name arrive as `Unknown(code)`; on Windows that code is the
/// virtual-key code.
pub fn from_rdev_key(key: rdev::Key) -> Option<Key> {
    use rdev::Key as R;

    let mapped = match key {
        R::Alt => Key::LMenu,
        R::AltGr => Key::RMenu,
        R::ControlLeft => Key::LControlKey,
        R::ControlRight => Key::RControlKey,
        R::ShiftLeft => Key::LShiftKey,
        R::ShiftRight => Key::RShiftKey,
        R::MetaLeft => Key::LWin,
        R::MetaRight => Key::RWin,
        R::Backspace => Key::Back,
        R::CapsLock => Key::CapsLock,
        R::Delete => Key::Delete,
        R::End => Key::End,
        R::Escape => Key::Escape,
        R::Home => Key::Home,
        R::Insert => Key::Insert,
        R::PageDown => Key::PageDown,
        R::PageUp => Key::PageUp,
        R::Return | R::KpReturn => Key::Enter,
        R::Space => Key::Space,
        R::Tab => Key::Tab,
        R::UpArrow => Key::Up,
        R::DownArrow => Key::Down,
        R::LeftArrow => Key::Left,
        R::RightArrow => Key::Right,
        R::PrintScreen => Key::PrintScreen,
        R::ScrollLock => Key::Scroll,
        R::Pause => Key::Pause,
        R::NumLock => Key::NumLock,
        R::F1 => Key::F1,
        R::F2 => Key::F2,
        R::F3 => Key::F3,
        R::F4 => Key::F4,
        R::F5 => Key::F5,
        R::F6 => Key::F6,
        R::F7 => Key::F7,
        R::F8 => Key::F8,
        R::F9 => Key::F9,
        R::F10 => Key::F10,
        R::F11 => Key::F11,
        R::F12 => Key::F12,
        R::Num0 => Key::D0,
        R::Num1 => Key::D1,
        R::Num2 => Key::D2,
        R::Num3 => Key::D3,
        R::Num4 => Key::D4,
        R::Num5 => Key::D5,
        R::Num6 => Key::D6,
        R::Num7 => Key::D7,
        R::Num8 => Key::D8,
        R::Num9 => Key::D9,
        R::KeyA => Key::A,
        R::KeyB => Key::B,
        R::KeyC => Key::C,
        R::KeyD => Key::D,
        R::KeyE => Key::E,
        R::KeyF => Key::F,
        R::KeyG => Key::G,
        R::KeyH => Key::H,
        R::KeyI => Key::I,
        R::KeyJ => Key::J,
        R::KeyK => Key::K,
        R::KeyL => Key::L,
        R::KeyM => Key::M,
        R::KeyN => Key::N,
        R::KeyO => Key::O,
        R::KeyP => Key::P,
        R::KeyQ => Key::Q,
        R::KeyR => Key::R,
        R::KeyS => Key::S,
        R::KeyT => Key::T,
        R::KeyU => Key::U,
        R::KeyV => Key::V,
        R::KeyW => Key::W,
        R::KeyX => Key::X,
        R::KeyY => Key::Y,
        R::KeyZ => Key::Z,
        R::BackQuote => Key::Oemtilde,
        R::Minus => Key::OemMinus,
        R::Equal => Key::Oemplus,
        R::LeftBracket => Key::OemOpenBrackets,
        R::RightBracket => Key::OemCloseBrackets,
        R::SemiColon => Key::OemSemicolon,
        R::Quote => Key::OemQuotes,
        R::BackSlash => Key::OemPipe,
        R::IntlBackslash => Key::OemBackslash,
        R::Comma => Key::Oemcomma,
        R::Dot => Key::OemPeriod,
        R::Slash => Key::OemQuestion,
        R::KpMinus => Key::Subtract,
        R::KpPlus => Key::Add,
        R::KpMultiply => Key::Multiply,
        R::KpDivide => Key::Divide,
        R::KpDelete => Key::Decimal,
        R::Kp0 => Key::NumPad0,
        R::Kp1 => Key::NumPad1,
        R::Kp2 => Key::NumPad2,
        R::Kp3 => Key::NumPad3,
        R::Kp4 => Key::NumPad4,
        R::Kp5 => Key::NumPad5,
        R::Kp6 => Key::NumPad6,
        R::Kp7 => Key::NumPad7,
        R::Kp8 => Key::NumPad8,
        R::Kp9 => Key::NumPad9,
        R::Function => return None,
        R::Unknown(code) => return unknown_code(code),
    };
    Some(mapped)
}

#[cfg(target_os = "windows")]
fn unknown_code(code: u32) -> Option<Key> {
    u16::try_from(code).ok().and_then(Key::from_virtual_key)
}

#[cfg(not(target_os = "windows"))]
fn unknown_code(_code: u32) -> Option<Key> {
    None
}

/// Map an rdev button to a mouse-button key. rdev reports the X buttons as
/// `Unknown(1)` / `Unknown(2)`.
pub fn from_rdev_button(button: rdev::Button) -> Option<Key> {
    match button {
        rdev::Button::Left => Some(Key::LButton),
        rdev::Button::Right => Some(Key::RButton),
        rdev::Button::Middle => Some(Key::MButton),
        rdev::Button::Unknown(index) => Key::from_x_button(u16::from(index)),
    }
}

/// Map a mouse-button key to an enigo button.
pub fn to_enigo_button(key: Key) -> Option<enigo::Button> {
    match key {
        Key::LButton => Some(enigo::Button::Left),
        Key::RButton => Some(enigo::Button::Right),
        Key::MButton => Some(enigo::Button::Middle),
        #[cfg(not(target_os = "macos"))]
        Key::XButton1 => Some(enigo::Button::Back),
        #[cfg(not(target_os = "macos"))]
        Key::XButton2 => Some(enigo::Button::Forward),
        _ => None,
    }
}

/// Map a keyboard key to an enigo key.
///
/// On Windows every key is sent by its virtual-key code.
#[cfg(target_os = "windows")]
pub fn to_enigo_key(key: Key) -> Option<enigo::Key> {
    if key.is_mouse_button() {
        return None;
    }
    Some(enigo::Key::Other(u32::from(key.virtual_key())))
}

/// Map a keyboard key to an enigo key.
///
/// Named keys map to their enigo counterparts, printable keys to the
/// character they type without modifiers. Left/right variants the backend
/// cannot tell apart collapse onto the plain modifier.
#[cfg(not(target_os = "windows"))]
pub fn to_enigo_key(key: Key) -> Option<enigo::Key> {
    use enigo::Key as E;

    let mapped = match key {
        Key::ShiftKey | Key::LShiftKey => E::Shift,
        Key::RShiftKey => E::RShift,
        Key::ControlKey | Key::LControlKey => E::Control,
        Key::RControlKey => E::RControl,
        Key::Menu | Key::LMenu | Key::RMenu => E::Alt,
        Key::LWin | Key::RWin => E::Meta,
        Key::F1 => E::F1,
        Key::F2 => E::F2,
        Key::F3 => E::F3,
        Key::F4 => E::F4,
        Key::F5 => E::F5,
        Key::F6 => E::F6,
        Key::F7 => E::F7,
        Key::F8 => E::F8,
        Key::F9 => E::F9,
        Key::F10 => E::F10,
        Key::F11 => E::F11,
        Key::F12 => E::F12,
        Key::Up => E::UpArrow,
        Key::Down => E::DownArrow,
        Key::Left => E::LeftArrow,
        Key::Right => E::RightArrow,
        Key::Home => E::Home,
        Key::End => E::End,
        Key::PageUp => E::PageUp,
        Key::PageDown => E::PageDown,
        Key::Back => E::Backspace,
        Key::Delete => E::Delete,
        Key::Insert => E::Insert,
        Key::Enter => E::Return,
        Key::Tab => E::Tab,
        Key::Escape => E::Escape,
        Key::Space => E::Space,
        Key::CapsLock => E::CapsLock,
        Key::PrintScreen => E::PrintScr,
        Key::Pause => E::Pause,
        Key::NumLock => E::Numlock,
        other => return printable(other).map(E::Unicode),
    };
    Some(mapped)
}

/// The unshifted US-layout character a printable key types.
#[cfg(not(target_os = "windows"))]
fn printable(key: Key) -> Option<char> {
    let code = key.virtual_key();
    let c = match key {
        Key::A | Key::B | Key::C | Key::D | Key::E | Key::F | Key::G | Key::H | Key::I
        | Key::J | Key::K | Key::L | Key::M | Key::N | Key::O | Key::P | Key::Q | Key::R
        | Key::S | Key::T | Key::U | Key::V | Key::W | Key::X | Key::Y | Key::Z => {
            char::from(code as u8).to_ascii_lowercase()
        }
        Key::D0 | Key::D1 | Key::D2 | Key::D3 | Key::D4 | Key::D5 | Key::D6 | Key::D7
        | Key::D8 | Key::D9 => char::from(code as u8),
        Key::NumPad0 | Key::NumPad1 | Key::NumPad2 | Key::NumPad3 | Key::NumPad4
        | Key::NumPad5 | Key::NumPad6 | Key::NumPad7 | Key::NumPad8 | Key::NumPad9 => {
            char::from(b'0' + (code - Key::NumPad0.virtual_key()) as u8)
        }
        Key::Oemtilde => '`',
        Key::OemMinus | Key::Subtract => '-',
        Key::Oemplus => '=',
        Key::Add => '+',
        Key::Multiply => '*',
        Key::Divide | Key::OemQuestion => '/',
        Key::Decimal | Key::OemPeriod => '.',
        Key::OemOpenBrackets => '[',
        Key::OemCloseBrackets => ']',
        Key::OemSemicolon => ';',
        Key::OemQuotes => '\'',
        Key::OemPipe | Key::OemBackslash => '\\',
        Key::Oemcomma => ',',
        _ => return None,
    };
    Some(c)
}
