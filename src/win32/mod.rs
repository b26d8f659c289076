//! Win32 implementations of the host service traits.
//!
//! Everything here is a thin shim: the queries map one-to-one onto Win32
//! calls and carry no state of their own beyond the raw input registration
//! RAII guard.

use ::widestring::U16CString;
use ::windows::{
    core::{Error as Win32Error, PCWSTR},
    Win32::{
        Foundation::{HWND, LPARAM, WPARAM},
        System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ},
        UI::{
            Input::{
                KeyboardAndMouse::{
                    ActivateKeyboardLayout, GetActiveWindow, GetFocus, MapVirtualKeyW,
                    ACTIVATE_KEYBOARD_LAYOUT_FLAGS, HKL, MAPVK_VSC_TO_VK_EX,
                },
                RegisterRawInputDevices, RAWINPUTDEVICE, RAWINPUTDEVICE_FLAGS, RIDEV_DEVNOTIFY,
                RIDEV_INPUTSINK, RIDEV_NOHOTKEYS, RIDEV_NOLEGACY, RIDEV_REMOVE,
            },
            WindowsAndMessaging::PostMessageW,
        },
    },
};

use crate::{
    errors::{Error, Result},
    host::{
        DeviceRegistrar, LocaleHost, MessageSink, RegistrationMode, ScanCodeResolver, WindowFocus,
        WindowHandle,
    },
    input::keyboard::LegacyMessage,
};

/// HID usage page/usage pair for the generic keyboard device class.
const USAGE_PAGE_GENERIC: u16 = 0x01;
const USAGE_KEYBOARD: u16 = 0x06;

/// Pseudo keyboard-layout handle selecting the next installed layout.
const HKL_NEXT: HKL = HKL(1);

/// Registry location of the locale hotkey scheme setting.
const TOGGLE_SUBKEY: &str = "Keyboard Layout\\Toggle";
const TOGGLE_VALUE: &str = "Language Hotkey";

/// The live Win32 environment as a host services implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Host;

impl WindowFocus for Win32Host {
    fn focused_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetFocus() };
        (hwnd.0 != 0).then_some(WindowHandle(hwnd.0))
    }

    fn active_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetActiveWindow() };
        (hwnd.0 != 0).then_some(WindowHandle(hwnd.0))
    }
}

impl ScanCodeResolver for Win32Host {
    fn virtual_key_for_scan(&self, scan_code: u8) -> u16 {
        unsafe { MapVirtualKeyW(u32::from(scan_code), MAPVK_VSC_TO_VK_EX) as u16 }
    }
}

impl MessageSink for Win32Host {
    fn post(&mut self, target: WindowHandle, message: &LegacyMessage) {
        // Posting can only fail if the target queue is gone, in which case
        // the message is moot anyway; drop silently like the focus fallback.
        unsafe {
            let _ = PostMessageW(
                HWND(target.0),
                message.kind.message(),
                WPARAM(message.virtual_key as usize),
                LPARAM(message.param as isize),
            );
        }
    }
}

impl LocaleHost for Win32Host {
    fn hotkey_setting(&self) -> Option<u32> {
        let subkey = U16CString::from_str(TOGGLE_SUBKEY).ok()?;
        let value = U16CString::from_str(TOGGLE_VALUE).ok()?;

        // The setting is stored as a REG_SZ digit, e.g. "1".
        let mut buffer = [0u16; 8];
        let mut size = (buffer.len() * 2) as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(subkey.as_ptr()),
                PCWSTR::from_raw(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut _),
                Some(&mut size),
            )
        };
        if status.is_err() {
            return None;
        }

        let text = U16CString::from_vec_truncate(buffer.to_vec());
        text.to_string().ok()?.trim().parse().ok()
    }

    fn cycle_input_locale(&mut self) {
        unsafe {
            ActivateKeyboardLayout(HKL_NEXT, ACTIVATE_KEYBOARD_LAYOUT_FLAGS(0));
        }
    }
}

/// Keyboard raw input registration against a target window.
///
/// The target is typically a message-only window: device-change
/// notifications are not delivered to a null target.
#[derive(Clone, Copy, Debug)]
pub struct RawKeyboardRegistrar {
    target: WindowHandle,
}

impl RawKeyboardRegistrar {
    /// A registrar delivering raw input to the given window.
    pub fn new(target: WindowHandle) -> Self {
        Self { target }
    }

    fn flags(mode: RegistrationMode) -> RAWINPUTDEVICE_FLAGS {
        let mut flags = RIDEV_INPUTSINK | RIDEV_DEVNOTIFY | RIDEV_NOHOTKEYS;
        if mode == RegistrationMode::NoLegacy {
            flags |= RIDEV_NOLEGACY;
        }
        flags
    }
}

impl DeviceRegistrar for RawKeyboardRegistrar {
    fn register(&mut self, mode: RegistrationMode) -> Result<()> {
        let device = RAWINPUTDEVICE {
            usUsagePage: USAGE_PAGE_GENERIC,
            usUsage: USAGE_KEYBOARD,
            dwFlags: Self::flags(mode),
            hwndTarget: HWND(self.target.0),
        };

        let registered = unsafe {
            RegisterRawInputDevices(&[device], ::std::mem::size_of::<RAWINPUTDEVICE>() as u32)
        };
        if registered.as_bool() {
            ::tracing::debug!(?mode, "Registered keyboards for raw input");
            Ok(())
        } else {
            Err(Error::DeviceRegistration {
                reason: Win32Error::from_win32().to_string(),
            })
        }
    }

    fn unregister(&mut self) -> Result<()> {
        let device = RAWINPUTDEVICE {
            usUsagePage: USAGE_PAGE_GENERIC,
            usUsage: USAGE_KEYBOARD,
            dwFlags: RIDEV_REMOVE,
            hwndTarget: HWND(0),
        };

        let removed = unsafe {
            RegisterRawInputDevices(&[device], ::std::mem::size_of::<RAWINPUTDEVICE>() as u32)
        };
        if removed.as_bool() {
            ::tracing::debug!("Removed keyboard raw input registration");
            Ok(())
        } else {
            Err(Error::DeviceUnregistration {
                reason: Win32Error::from_win32().to_string(),
            })
        }
    }
}
