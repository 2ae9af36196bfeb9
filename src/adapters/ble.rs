//! BLE command channel adapter.
//!
//! Carries the line-oriented text protocol between the companion app and
//! the [`Controller`](crate::app::service::Controller): inbound command
//! lines arrive as GATT writes, outbound notices leave as GATT notifies.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via `esp_idf_svc::sys`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                      | Perms       |
//! |----------------|---------------------------|-------------|
//! | Command        | `abcd0001-…-1234567890ab` | Write       |
//! | Event          | `abcd0002-…-1234567890ab` | Read+Notify |
//!
//! On ESP-IDF the Bluedroid write callback buffers raw writes in a static
//! queue; the main loop drains it with [`take_command_data`] and feeds
//! each write through [`BleAdapter::on_command_write`], which validates
//! and queues the decoded line for [`BleAdapter::pop_line`].

use core::fmt;
use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::proto;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x12345678_1234_1234_1234_1234567890ab;
pub const CHAR_COMMAND: u128 = 0xabcd0001_1234_1234_1234_1234567890ab;
pub const CHAR_EVENT: u128 = 0xabcd0002_1234_1234_1234_1234567890ab;

/// Longest accepted command line.  Covers a full `SIMLOG` batch with
/// headroom; anything longer is a misbehaving peer.
pub const MAX_LINE_BYTES: usize = 160;
/// Command lines buffered between main-loop polls.
pub const RX_QUEUE_DEPTH: usize = 8;

/// One decoded inbound command line.
pub type CommandLine = heapless::String<MAX_LINE_BYTES>;

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    StackInitFailed,
    DataTooLong,
    InvalidUtf8,
    Backlog,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackInitFailed => write!(f, "BLE stack initialisation failed"),
            Self::DataTooLong => write!(f, "BLE write exceeds max command line length"),
            Self::InvalidUtf8 => write!(f, "BLE write contains invalid UTF-8"),
            Self::Backlog => write!(f, "command queue full, line dropped"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation helpers
// ───────────────────────────────────────────────────────────────

fn decode_line(raw: &[u8]) -> Result<CommandLine, ChannelError> {
    if raw.len() > MAX_LINE_BYTES {
        return Err(ChannelError::DataTooLong);
    }
    let s = core::str::from_utf8(raw).map_err(|_| ChannelError::InvalidUtf8)?;
    let mut line = CommandLine::new();
    line.push_str(s).map_err(|_| ChannelError::DataTooLong)?;
    Ok(line)
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
// conn_id 0 is a valid Bluedroid connection id, so connection presence
// gets its own flag rather than a sentinel conn_id.
#[cfg(target_os = "espidf")]
static BLE_CONN_ACTIVE: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_COMMAND_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_EVENT_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);

// Raw command writes bridging GATTS write callback → main loop.
// GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
#[cfg(target_os = "espidf")]
static BLE_RX_WRITES: std::sync::Mutex<
    heapless::Deque<heapless::Vec<u8, MAX_LINE_BYTES>, RX_QUEUE_DEPTH>,
> = std::sync::Mutex::new(heapless::Deque::new());

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    unsafe {
        t.uuid.uuid128 = uuid.to_le_bytes();
    }
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_gatt_char(svc_handle: u16, uuid: u128, perm: u32, prop: u32) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid128_to_esp(uuid);
    esp_ble_gatts_add_char(
        svc_handle,
        &mut char_uuid,
        perm as esp_gatt_perm_t,
        prop as esp_gatt_char_prop_t,
        core::ptr::null_mut(),
        core::ptr::null_mut(),
    );
}

/// Consume one raw command write buffered by the GATTS callback.
#[cfg(target_os = "espidf")]
pub fn take_command_data() -> Option<heapless::Vec<u8, MAX_LINE_BYTES>> {
    BLE_RX_WRITES.lock().ok().and_then(|mut q| q.pop_front())
}

#[cfg(not(target_os = "espidf"))]
pub fn take_command_data() -> Option<heapless::Vec<u8, MAX_LINE_BYTES>> {
    None
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let svc_uuid = uuid128_to_esp(SERVICE_UUID);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: svc_uuid,
                    inst_id: 0,
                },
                is_primary: true,
            };
            esp_ble_gatts_create_service(gatts_if, &mut svc_id, 8);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let p = &(*param).create;
            let svc_handle = p.service_handle;
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            esp_ble_gatts_start_service(svc_handle);
            BLE_CHAR_STEP.store(1, AtomicOrdering::Relaxed);
            add_gatt_char(
                svc_handle,
                CHAR_COMMAND,
                ESP_GATT_PERM_WRITE,
                ESP_GATT_CHAR_PROP_BIT_WRITE,
            );
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let p = &(*param).add_char;
            let handle = p.attr_handle;
            let step = BLE_CHAR_STEP.load(AtomicOrdering::Relaxed);
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match step {
                1 => {
                    BLE_COMMAND_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: command char (handle={})", handle);
                    BLE_CHAR_STEP.store(2, AtomicOrdering::Relaxed);
                    add_gatt_char(
                        svc_handle,
                        CHAR_EVENT,
                        ESP_GATT_PERM_READ,
                        ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                    );
                }
                2 => {
                    BLE_EVENT_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    BLE_CHAR_STEP.store(3, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: event char (handle={}) — all registered", handle);
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            BLE_CONN_ID.store(p.conn_id as u32, AtomicOrdering::Relaxed);
            BLE_CONN_ACTIVE.store(true, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_CONN_ACTIVE.store(false, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: client disconnected");
            // Restart advertising after disconnect.
            let mut adv_params = esp_ble_adv_params_t {
                adv_int_min: 0x20,
                adv_int_max: 0x40,
                adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
                own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
                adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
                ..core::mem::zeroed()
            };
            esp_ble_gap_start_advertising(&mut adv_params);
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            let handle = p.handle as u32;
            if handle != BLE_COMMAND_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                return;
            }
            let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
            if data.len() > MAX_LINE_BYTES {
                log::warn!("BLE GATTS: oversize command write dropped ({} bytes)", data.len());
                return;
            }
            let mut raw = heapless::Vec::new();
            let _ = raw.extend_from_slice(data);
            if let Ok(mut q) = BLE_RX_WRITES.lock() {
                if q.push_back(raw).is_err() {
                    log::warn!("BLE GATTS: command queue full, write dropped");
                }
            }
        }
        _ => {}
    }
}

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    rx_lines: heapless::Deque<CommandLine, RX_QUEUE_DEPTH>,
    /// Simulation: last notice "sent" over the event characteristic.
    #[cfg(not(target_os = "espidf"))]
    last_notice: Option<proto::Notice>,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self {
            state: BleState::Idle,
            device_name,
            rx_lines: heapless::Deque::new(),
            #[cfg(not(target_os = "espidf"))]
            last_notice: None,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, BleState::Advertising | BleState::Connected)
    }

    pub fn start(&mut self) {
        info!("BLE: starting advertising as '{}'", self.device_name);
        self.platform_start();
        if self.state != BleState::Failed {
            self.state = BleState::Advertising;
        }
    }

    pub fn stop(&mut self) {
        self.platform_stop();
        self.state = BleState::Idle;
        self.rx_lines.clear();
        info!("BLE: stopped");
    }

    /// Validate one raw command write and queue the decoded line.
    pub fn on_command_write(&mut self, raw: &[u8]) -> Result<(), ChannelError> {
        let line = decode_line(raw)?;
        self.rx_lines
            .push_back(line)
            .map_err(|_| ChannelError::Backlog)?;
        Ok(())
    }

    /// Consume the oldest queued command line, if any.
    pub fn pop_line(&mut self) -> Option<CommandLine> {
        self.rx_lines.pop_front()
    }

    pub fn on_central_connected(&mut self) {
        info!("BLE: central connected");
        self.state = BleState::Connected;
    }

    pub fn on_central_disconnected(&mut self) {
        info!("BLE: central disconnected");
        if self.state != BleState::Idle {
            self.state = BleState::Advertising;
        }
    }

    /// Mirror the Bluedroid connection flag into the adapter state.
    /// Call from the main loop; connect/disconnect events land in a
    /// static from the GATTS callback task.
    #[cfg(target_os = "espidf")]
    pub fn sync_connection_state(&mut self) {
        let active = BLE_CONN_ACTIVE.load(AtomicOrdering::Relaxed);
        match (self.state, active) {
            (BleState::Advertising, true) => self.on_central_connected(),
            (BleState::Connected, false) => self.on_central_disconnected(),
            _ => {}
        }
    }

    /// Latest payload pushed through the event characteristic (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn last_notice(&self) -> Option<&str> {
        self.last_notice.as_deref()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) {
        use esp_idf_svc::sys::*;
        use log::error;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                error!("BLE: bt_controller_init failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                error!("BLE: bt_controller_enable failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                error!("BLE: bluedroid_init failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                error!("BLE: bluedroid_enable failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            // Register GAP and GATTS callbacks.  Event dispatching uses
            // static callback functions that buffer into the RX queue for
            // main-loop processing.
            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // Set device name for advertising (NUL-terminated for the C API).
            let mut name_z = [0u8; 25];
            let name = self.device_name.as_bytes();
            let len = name.len().min(24);
            name_z[..len].copy_from_slice(&name[..len]);
            esp_ble_gap_set_device_name(name_z.as_ptr() as *const _);

            // Configure advertising parameters.
            let mut adv_params = esp_ble_adv_params_t {
                adv_int_min: 0x20,
                adv_int_max: 0x40,
                adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
                own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
                adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
                ..core::mem::zeroed()
            };
            esp_ble_gap_start_advertising(&mut adv_params);

            info!(
                "BLE(espidf): Bluedroid stack initialized, advertising as '{}'",
                self.device_name
            );
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) {
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;
        unsafe {
            esp_ble_gap_stop_advertising();
            esp_bluedroid_disable();
            esp_bluedroid_deinit();
            esp_bt_controller_disable();
            esp_bt_controller_deinit();
        }
        BLE_CONN_ACTIVE.store(false, AtomicOrdering::Relaxed);
        if let Ok(mut q) = BLE_RX_WRITES.lock() {
            q.clear();
        }
        info!("BLE(espidf): stack shut down");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("BLE(sim): stopped");
    }

    #[cfg(target_os = "espidf")]
    fn notify(&mut self, payload: &str) {
        use esp_idf_svc::sys::*;
        let handle = BLE_EVENT_CHAR_HANDLE.load(AtomicOrdering::Relaxed);
        if handle == 0 || !BLE_CONN_ACTIVE.load(AtomicOrdering::Relaxed) {
            debug!("BLE: notify suppressed (no subscriber) — {}", payload);
            return;
        }
        unsafe {
            esp_ble_gatts_send_indicate(
                BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as u8,
                BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
                handle as u16,
                payload.len() as u16,
                payload.as_ptr() as *mut u8,
                false,
            );
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn notify(&mut self, payload: &str) {
        if self.state != BleState::Connected {
            debug!("BLE(sim): notify suppressed (no subscriber) — {}", payload);
            return;
        }
        let mut notice = proto::Notice::new();
        let _ = notice.push_str(payload);
        self.last_notice = Some(notice);
        info!("BLE(sim): notified — {}", payload);
    }
}

// ───────────────────────────────────────────────────────────────
// EventSink implementation
// ───────────────────────────────────────────────────────────────

impl EventSink for BleAdapter {
    fn emit(&mut self, event: &AppEvent) {
        let notice = proto::encode(event);
        self.notify(&notice);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
