//! Demo: registers keyboards for no-legacy raw input and rebuilds the
//! legacy message stream with `keywire`.
//!
//! Run it, focus any window of the process, and watch the traces: every
//! physical key transition arrives as a raw report, is synthesized back into
//! a legacy message, and the locale hotkey chord (per the current system
//! setting) cycles the input locale even though the host's own hotkey path
//! is bypassed.

use ::tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn main() {
    ::tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    #[cfg(windows)]
    win::run().expect("raw input demo failed");

    #[cfg(not(windows))]
    eprintln!("This demo drives the Win32 raw input channel and only runs on Windows.");
}

#[cfg(windows)]
mod win {
    use ::keywire::{
        errors::Result,
        host::{DeviceRegistrar, RegistrationMode, WindowHandle},
        input::{
            keyboard::{KeyTransition, LegacyMessage, TransitionKind},
            raw::KEY_FLAG_EXTENDED,
        },
        pipeline::InputPipeline,
        win32::{RawKeyboardRegistrar, Win32Host},
    };
    use ::keywire::{host::DeviceHandle, input::keyboard::NeverConsumes};
    use ::std::{mem, thread, time::Duration};
    use ::tracing::{info, trace};
    use ::widestring::U16CString;
    use ::windows::{
        core::PCWSTR,
        Win32::{
            Foundation::{HWND, LPARAM, LRESULT, WPARAM},
            UI::{
                Input::{
                    GetRawInputData, HRAWINPUT, RAWINPUT, RAWINPUTHEADER, RID_INPUT,
                    RIM_TYPEKEYBOARD,
                },
                WindowsAndMessaging::{
                    CreateWindowExW, DefWindowProcW, DispatchMessageW, PeekMessageW,
                    RegisterClassExW, TranslateMessage, HWND_MESSAGE, MSG, PM_REMOVE,
                    WINDOW_EX_STYLE, WINDOW_STYLE, WM_ACTIVATEAPP, WM_INPUT, WM_QUIT,
                    WM_SETTINGCHANGE, WNDCLASSEXW,
                },
            },
        },
    };

    /// Bounded poll latency between queue drains.
    const IDLE_WAIT: Duration = Duration::from_millis(17);

    extern "system" fn message_only_proc(
        hwnd: HWND,
        umsg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        unsafe { DefWindowProcW(hwnd, umsg, wparam, lparam) }
    }

    fn create_message_only_window() -> Result<WindowHandle> {
        let class_name = U16CString::from_str("keywire-example::MessageOnly")
            .expect("class name contains no null bytes");

        let wnd_class = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(message_only_proc),
            lpszClassName: PCWSTR::from_raw(class_name.as_ptr()),
            ..Default::default()
        };
        unsafe { RegisterClassExW(&wnd_class) };

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR::from_raw(class_name.as_ptr()),
                PCWSTR::null(),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                None,
                None,
                None,
            )
        };
        Ok(WindowHandle(hwnd.0))
    }

    /// Reads one raw input packet and adapts it into a [`KeyTransition`].
    fn read_transition(handle: HRAWINPUT) -> Option<KeyTransition> {
        let mut raw = RAWINPUT::default();
        let mut size = mem::size_of::<RAWINPUT>() as u32;
        let copied = unsafe {
            GetRawInputData(
                handle,
                RID_INPUT,
                Some(&mut raw as *mut _ as *mut _),
                &mut size,
                mem::size_of::<RAWINPUTHEADER>() as u32,
            )
        };
        if copied == u32::MAX || copied == 0 {
            return None;
        }
        if raw.header.dwType != RIM_TYPEKEYBOARD.0 {
            return None;
        }

        let keyboard = unsafe { raw.data.keyboard };
        Some(KeyTransition {
            kind: TransitionKind::from_message(keyboard.Message)?,
            virtual_key: keyboard.VKey,
            scan_code: keyboard.MakeCode as u8,
            is_extended: keyboard.Flags & KEY_FLAG_EXTENDED != 0,
            device: DeviceHandle(raw.header.hDevice.0),
        })
    }

    pub(super) fn run() -> Result<()> {
        let target = create_message_only_window()?;
        let mut registrar = RawKeyboardRegistrar::new(target);
        registrar.register(RegistrationMode::NoLegacy)?;
        info!("Keyboards registered for no-legacy raw input");

        let mut pipeline = InputPipeline::new(Win32Host, NeverConsumes);

        let mut msg = MSG::default();
        loop {
            if !unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
                thread::sleep(IDLE_WAIT);
                continue;
            }

            match msg.message {
                WM_QUIT => break,
                WM_INPUT => {
                    if let Some(transition) = read_transition(HRAWINPUT(msg.lParam.0)) {
                        let outcome = pipeline.process_transition(&transition);
                        trace!(?outcome, "Processed raw transition");
                    }
                }
                WM_SETTINGCHANGE => pipeline.handle_setting_change(msg.wParam.0 as u32),
                WM_ACTIVATEAPP if msg.wParam.0 != 0 => pipeline.handle_activation(),
                identifier => {
                    if let Some(kind) = TransitionKind::from_message(identifier) {
                        let legacy = LegacyMessage {
                            kind,
                            virtual_key: msg.wParam.0 as u16,
                            param: msg.lParam.0 as u32,
                        };
                        if pipeline.intercept_message(&legacy)
                            == ::keywire::input::keyboard::Interception::Swallowed
                        {
                            trace!(?legacy, "Locale chord swallowed message");
                            continue;
                        }
                    }
                }
            }

            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        registrar.unregister()?;
        Ok(())
    }
}
