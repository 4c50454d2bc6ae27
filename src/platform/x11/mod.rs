//! X11 platform adapters.
//!
//! Window identity (`_NET_ACTIVE_WINDOW`, `_NET_WM_PID`, `_NET_WM_NAME`)
//! is read directly over the X protocol. Activation and key injection go
//! through `xdotool`/`xset` (see [`input`]), the clipboard through
//! `xclip` (see [`clipboard`]).

pub mod clipboard;
pub mod input;

use std::time::Duration;

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, Atom, AtomEnum, ConnectionExt as _, Window};
use x11rb::rust_connection::RustConnection;

use super::command::CommandRunner;
use super::procfs;
use super::{OwningProcess, PlatformError, WindowControl, WindowHandle};

pub use clipboard::XclipClipboard;
pub use input::XdotoolInput;

/// Title bytes fetched per `GetProperty` request, in 32-bit units.
const TITLE_CHUNK_LONGS: u32 = 1024;

/// Pre-interned atoms for property queries.
struct Atoms {
    net_active_window: Atom,
    net_wm_pid: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
}

/// X11 display connection used for window identity queries.
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
}

impl X11Display {
    /// Connect to the X11 display and intern required atoms.
    ///
    /// Any failure here means the focused window cannot be determined, so
    /// it is reported as [`PlatformError::NoActiveWindow`].
    pub fn connect() -> Result<Self, PlatformError> {
        let (conn, screen_num) = RustConnection::connect(None)
            .map_err(|e| PlatformError::NoActiveWindow(format!("X11 connect failed: {e}")))?;

        let root = conn.setup().roots[screen_num].root;

        let atoms = Atoms {
            net_active_window: intern(&conn, b"_NET_ACTIVE_WINDOW")?,
            net_wm_pid: intern(&conn, b"_NET_WM_PID")?,
            net_wm_name: intern(&conn, b"_NET_WM_NAME")?,
            utf8_string: intern(&conn, b"UTF8_STRING")?,
        };

        tracing::debug!(screen = screen_num, root, "connected to X11 display");

        Ok(Self { conn, root, atoms })
    }

    /// Read `_NET_ACTIVE_WINDOW` on the root window.
    pub fn active_window(&self) -> Result<Window, PlatformError> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .map_err(|e| PlatformError::NoActiveWindow(format!("get_property: {e}")))?
            .reply()
            .map_err(|e| PlatformError::NoActiveWindow(format!("get_property reply: {e}")))?;

        match first_u32(reply.format, &reply.value) {
            Some(0) | None => Err(PlatformError::NoActiveWindow(
                "_NET_ACTIVE_WINDOW is unset".into(),
            )),
            Some(window) => Ok(window),
        }
    }

    /// Read `_NET_WM_PID` on `window`.
    pub fn window_pid(&self, window: Window) -> Result<u32, PlatformError> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.net_wm_pid,
                AtomEnum::CARDINAL,
                0,
                1,
            )
            .map_err(|e| PlatformError::ProcessLookup(format!("get_property _NET_WM_PID: {e}")))?
            .reply()
            .map_err(|e| PlatformError::ProcessLookup(format!("get_property reply: {e}")))?;

        first_u32(reply.format, &reply.value).ok_or_else(|| {
            PlatformError::ProcessLookup(format!("window {window} has no _NET_WM_PID"))
        })
    }

    /// Read the window title, preferring `_NET_WM_NAME` over `WM_NAME`.
    ///
    /// An untitled window yields an empty string.
    pub fn window_title(&self, window: Window) -> Result<String, PlatformError> {
        let utf8 = self.read_text(window, self.atoms.net_wm_name, self.atoms.utf8_string)?;
        if !utf8.is_empty() {
            return Ok(utf8);
        }
        self.read_text(window, AtomEnum::WM_NAME.into(), AtomEnum::ANY.into())
    }

    /// Read a text property in full and decode it by its actual type.
    fn read_text(&self, window: Window, property: Atom, ty: Atom) -> Result<String, PlatformError> {
        let mut value = Vec::new();
        let mut offset = 0;
        loop {
            let reply = self
                .conn
                .get_property(false, window, property, ty, offset, TITLE_CHUNK_LONGS)
                .map_err(|e| PlatformError::TitleLookup(format!("get_property: {e}")))?
                .reply()
                .map_err(|e| PlatformError::TitleLookup(format!("get_property reply: {e}")))?;

            // A type mismatch returns no data, only the real type and size.
            let wrong_type = ty != u32::from(AtomEnum::ANY) && reply.type_ != ty;
            if reply.format != 8 || wrong_type {
                return Ok(String::new());
            }
            value.extend_from_slice(&reply.value);
            if reply.bytes_after == 0 {
                return Ok(decode_text(reply.type_ == u32::from(AtomEnum::STRING), &value));
            }
            offset += TITLE_CHUNK_LONGS;
        }
    }
}

/// Decode a title property. `STRING` is Latin-1; anything else
/// (`UTF8_STRING`, or the ASCII subset of `COMPOUND_TEXT`) is read as UTF-8.
fn decode_text(latin1: bool, value: &[u8]) -> String {
    let text: String = if latin1 {
        value.iter().map(|&b| char::from(b)).collect()
    } else {
        String::from_utf8_lossy(value).into_owned()
    };
    text.trim().to_string()
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom, PlatformError> {
    Ok(xproto::intern_atom(conn, false, name)
        .map_err(|e| PlatformError::NoActiveWindow(format!("intern_atom: {e}")))?
        .reply()
        .map_err(|e| PlatformError::NoActiveWindow(format!("intern_atom reply: {e}")))?
        .atom)
}

/// First 32-bit item of a property value, if the property has that shape.
fn first_u32(format: u8, value: &[u8]) -> Option<u32> {
    if format != 32 || value.len() < 4 {
        return None;
    }
    Some(u32::from_ne_bytes([value[0], value[1], value[2], value[3]]))
}

/// Parse a handle back into an X11 window id.
fn window_id(handle: &WindowHandle) -> Result<Window, String> {
    handle
        .as_str()
        .parse::<Window>()
        .map_err(|_| format!("invalid window id {handle:?}"))
}

/// X11 implementation of [`WindowControl`].
///
/// Identity queries use the display connection; activation and key
/// injection are delegated to [`XdotoolInput`].
pub struct X11WindowControl<R> {
    display: X11Display,
    input: XdotoolInput<R>,
}

impl<R: CommandRunner> X11WindowControl<R> {
    pub fn connect(runner: R) -> Result<Self, PlatformError> {
        Ok(Self {
            display: X11Display::connect()?,
            input: XdotoolInput::new(runner),
        })
    }
}

impl<R: CommandRunner> WindowControl for X11WindowControl<R> {
    async fn current_window(&self) -> Result<WindowHandle, PlatformError> {
        let window = self.display.active_window()?;
        Ok(WindowHandle::new(window.to_string()))
    }

    async fn resolve_process(&self, window: &WindowHandle) -> Result<OwningProcess, PlatformError> {
        let id = window_id(window).map_err(PlatformError::ProcessLookup)?;
        let pid = self.display.window_pid(id)?;
        let executable = procfs::executable_name(pid)
            .map_err(|e| PlatformError::ProcessLookup(format!("PID {pid}: {e}")))?;
        Ok(OwningProcess { pid, executable })
    }

    async fn title(&self, window: &WindowHandle) -> Result<String, PlatformError> {
        let id = window_id(window).map_err(PlatformError::TitleLookup)?;
        self.display.window_title(id)
    }

    async fn activate(&self, window: &WindowHandle) -> Result<(), PlatformError> {
        self.input.activate(window).await
    }

    async fn simulate_keys(
        &self,
        window: &WindowHandle,
        keys: &[String],
        delay: Duration,
    ) -> Result<(), PlatformError> {
        self.input.send_keys(window, keys, delay).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_u32_reads_native_endian() {
        let value = 4567u32.to_ne_bytes();
        assert_eq!(first_u32(32, &value), Some(4567));
    }

    #[test]
    fn first_u32_rejects_wrong_shape() {
        assert_eq!(first_u32(8, &[1, 2, 3, 4]), None);
        assert_eq!(first_u32(32, &[1, 2]), None);
        assert_eq!(first_u32(32, &[]), None);
    }

    #[test]
    fn latin1_title_decoded_per_byte() {
        // "Café" in ISO-8859-1.
        assert_eq!(decode_text(true, b"Caf\xe9"), "Café");
    }

    #[test]
    fn utf8_title_decoded_and_trimmed() {
        assert_eq!(decode_text(false, "  Café \n".as_bytes()), "Café");
        assert_eq!(decode_text(false, b""), "");
    }

    #[test]
    fn window_id_parses_decimal() {
        assert_eq!(window_id(&WindowHandle::new("123")), Ok(123));
    }

    #[test]
    fn window_id_rejects_garbage() {
        let err = window_id(&WindowHandle::new("0x7b")).unwrap_err();
        assert!(err.contains("invalid window id"));
    }
}
