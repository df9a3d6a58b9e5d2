//! Multi-surface gesture manager and device discovery (I/O layer).
//!
//! Pure event-processing logic lives in [`crate::event`] and
//! [`crate::recognizer`].
use std::process::{Command, ExitCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device};
use log::{debug, error, info, warn};

use crate::config::{AppConfig, SurfaceConfig, VidgestError, parse_config_file, parse_usb_id};
use crate::event::{ControlEvent, SampleStream, classify_event, control_action_for, process_touch_events, resolve_action};
use crate::recognizer::GestureRecognizer;

// -- GestureManager (top-level orchestrator) ------------------

/// Manages gesture recognition across multiple touch surfaces.
pub struct GestureManager {
    config: AppConfig,
    running: Arc<AtomicBool>,
}

impl GestureManager {
    pub fn new(config_path: impl AsRef<std::path::Path>) -> Result<Self, VidgestError> {
        Ok(Self {
            config: parse_config_file(config_path.as_ref())?,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start listening to all configured surfaces.
    pub fn start(&mut self) {
        if self.config.surfaces.is_empty() {
            error!("No surfaces configured");
            return;
        }

        self.running.store(true, Ordering::Relaxed);
        info!("Starting gesture manager");

        let mut handles = Vec::new();

        for (surface_id, surface_config) in &self.config.surfaces {
            if let Some(device) = find_device(surface_id, surface_config) {
                let surface_id = surface_id.clone();
                let config = surface_config.clone();
                let running = Arc::clone(&self.running);

                handles.push(
                    thread::Builder::new()
                        .name(format!("gesture-{surface_id}"))
                        .spawn(move || {
                            run_surface_loop(&surface_id, device, &config, &running);
                        })
                        .expect("Failed to spawn surface thread"),
                );
            } else {
                warn!("Device not found: {surface_id}");
            }
        }

        if handles.is_empty() {
            error!("No devices found, exiting");
            return;
        }

        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Stop listening to surfaces.
    #[allow(dead_code)]
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Gesture manager stopped");
    }

    /// Get a reference to the running flag for signal handling.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Get the log level from the parsed configuration.
    pub fn config_log_level(&self) -> &str {
        &self.config.log_level
    }

    /// Get the optional log file path from the parsed configuration.
    pub fn config_log_file(&self) -> Option<&str> {
        self.config.log_file.as_deref()
    }
}

// -- Device I/O -----------------------------------------------

/// Check if a device has multi-touch capabilities.
fn is_touch_device(device: &Device) -> bool {
    let Some(abs_axes) = device.supported_absolute_axes() else {
        return false;
    };
    abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)
        && abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_Y)
}

/// Find a touchscreen device by USB vendor:product ID.
fn find_device(surface_id: &str, config: &SurfaceConfig) -> Option<Device> {
    let Some((vendor, product)) = parse_usb_id(&config.device_usb_id) else {
        warn!(
            "Surface {surface_id}: invalid USB ID format '{}' (expected vendor:product)",
            config.device_usb_id
        );
        return None;
    };

    for (path, device) in evdev::enumerate() {
        if !is_touch_device(&device) {
            continue;
        }
        let id = device.input_id();
        if id.vendor() == vendor && id.product() == product {
            info!(
                "Found device for {} by USB ID {}: {} ({})",
                surface_id,
                config.device_usb_id,
                device.name().unwrap_or("unknown"),
                path.display()
            );
            return Some(device);
        }
    }

    warn!(
        "Surface {}: no touch device with USB ID {} found",
        surface_id, config.device_usb_id
    );
    None
}

/// Size the recognizer from device axis info and start the event loop.
fn run_surface_loop(
    surface_id: &str,
    mut device: Device,
    config: &SurfaceConfig,
    running: &Arc<AtomicBool>,
) {
    let abs = match device.get_abs_state() {
        Ok(state) => state,
        Err(e) => {
            error!("Surface {surface_id} failed to get abs state: {e}");
            return;
        }
    };

    let x = &abs[AbsoluteAxisType::ABS_MT_POSITION_X.0 as usize];
    let y = &abs[AbsoluteAxisType::ABS_MT_POSITION_Y.0 as usize];

    info!(
        "Started processing surface: {surface_id} (USB {})",
        config.device_usb_id
    );
    debug!(
        "  X range: {}..{}, Y range: {}..{}",
        x.minimum, x.maximum, y.minimum, y.maximum
    );

    let mut recognizer = GestureRecognizer::new(config.settings.clone());
    recognizer.set_surface_size(
        (x.maximum - x.minimum) as f64,
        (y.maximum - y.minimum) as f64,
    );
    let mut stream = SampleStream::new();

    event_loop(surface_id, &mut device, &mut stream, &mut recognizer, config, running);
}

/// Blocking event loop - reads from the device and dispatches control
/// events.
fn event_loop(
    surface_id: &str,
    device: &mut Device,
    stream: &mut SampleStream,
    recognizer: &mut GestureRecognizer,
    config: &SurfaceConfig,
    running: &Arc<AtomicBool>,
) {
    while running.load(Ordering::Relaxed) {
        match device.fetch_events().map(|iter| iter.collect::<Vec<_>>()) {
            Ok(events) => {
                for event in &events {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Some(te) = classify_event(event) {
                        let fired = process_touch_events(stream, recognizer, &[te]);
                        for control in fired {
                            execute_control(surface_id, &control, config);
                        }
                    }
                }
            }
            Err(e) => {
                if running.load(Ordering::Relaxed) {
                    warn!("Surface {surface_id} disconnected: {e}");
                    // A contact may be mid-drag; report the loss as a cancel.
                    for control in recognizer.cancel() {
                        execute_control(surface_id, &control, config);
                    }
                    stream.reset();
                    attempt_reconnect(surface_id, device, stream, recognizer, config, running);
                }
                break;
            }
        }
    }
}

/// Spawn the shell command bound to a recognized control event.
fn execute_control(surface_id: &str, control: &ControlEvent, config: &SurfaceConfig) {
    let Some(action) = control_action_for(control) else {
        debug!("{surface_id}: unmapped control event {control:?}");
        return;
    };

    let action_name: &str = action.into();
    if let Some(command) = resolve_action(action, &config.actions) {
        match Command::new("sh").arg("-c").arg(command).spawn() {
            Ok(_) => debug!("Spawned command: {command}"),
            Err(e) => error!("Failed to execute command '{command}': {e}"),
        }
        info!("{surface_id}: {action_name}");
    }
}

/// Attempt to reconnect to a device after it disconnects.
fn attempt_reconnect(
    surface_id: &str,
    device: &mut Device,
    stream: &mut SampleStream,
    recognizer: &mut GestureRecognizer,
    config: &SurfaceConfig,
    running: &Arc<AtomicBool>,
) {
    const MAX_RETRIES: usize = 10;
    const RETRY_INTERVAL: Duration = Duration::from_secs(5);

    for attempt in 1..=MAX_RETRIES {
        if !running.load(Ordering::Relaxed) {
            return;
        }
        info!("Reconnect attempt {attempt}/{MAX_RETRIES} for {surface_id}...");
        thread::sleep(RETRY_INTERVAL);

        if let Some(new_device) = find_device(surface_id, config) {
            info!("Reconnected to {surface_id}");
            *device = new_device;
            event_loop(surface_id, device, stream, recognizer, config, running);
            return;
        }
    }
    error!("Failed to reconnect to {surface_id} after {MAX_RETRIES} attempts");
}

/// List all multi-touch capable devices.
pub fn list_touch_devices() -> ExitCode {
    println!("\n=== vidgest: Available Touchscreen Devices ===\n");
    let mut touch_count = 0;

    for (path, device) in evdev::enumerate() {
        if !is_touch_device(&device) {
            continue;
        }

        touch_count += 1;
        println!(
            "Device {touch_count}:\n\
             \x20 Path:      {}\n\
             \x20 Name:      {}\n\
             \x20 USB ID:    {:04x}:{:04x}\n\
             \x20 Phys:      {}\n",
            path.display(),
            device.name().unwrap_or("unknown"),
            device.input_id().vendor(),
            device.input_id().product(),
            device.physical_path().unwrap_or("N/A"),
        );
    }

    if touch_count == 0 {
        println!(
            "No multi-touch devices found.\n\n\
             Troubleshooting:\n\
             \x20 - Check if touchscreen is connected\n\
             \x20 - Run 'libinput list-devices' to see all devices\n\
             \x20 - Run as root if devices are not visible"
        );
        return ExitCode::FAILURE;
    }

    println!(
        "Found {touch_count} touch device(s).\n\n\
         Add the USB ID to your gestures.toml:\n\
         \x20 [surface.<name>]\n\
         \x20 device_usb_id = \"<USB ID>\"\n\
         \x20 enabled = true"
    );
    ExitCode::SUCCESS
}
