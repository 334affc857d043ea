//! xdg-desktop-portal Screenshot integration.

use futures::StreamExt;
use std::collections::HashMap;
use zbus::zvariant::OwnedValue;
use zbus::{Connection, proxy};

use super::types::CaptureError;

/// D-Bus proxy for the portal Screenshot interface.
#[proxy(
    interface = "org.freedesktop.portal.Screenshot",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Screenshot {
    /// Take a screenshot. Returns the object path of a Request whose
    /// `Response` signal carries the result.
    async fn screenshot(
        &self,
        parent_window: &str,
        options: HashMap<String, zbus::zvariant::Value<'_>>,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

/// D-Bus proxy for org.freedesktop.portal.Request, used to receive the
/// Response signal.
#[proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    /// `response` is 0 = success, 1 = cancelled by the user, 2 = other error.
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// Capture a whole-frame screenshot via the portal.
///
/// The portal may prompt the user for permission; a refusal surfaces as
/// [`CaptureError::PermissionDenied`].
///
/// # Returns
/// A `file://` URI pointing at the captured image.
pub async fn take_screenshot() -> Result<String, CaptureError> {
    let connection = Connection::session().await.map_err(CaptureError::DBus)?;

    let proxy = ScreenshotProxy::new(&connection)
        .await
        .map_err(CaptureError::DBus)?;

    // Non-interactive: capture the visible frame immediately.
    let mut options: HashMap<String, zbus::zvariant::Value<'_>> = HashMap::new();
    options.insert("modal".to_string(), false.into());
    options.insert("interactive".to_string(), false.into());

    let request_path = proxy.screenshot("", options).await.map_err(|e| {
        log::error!("Portal screenshot call failed: {e}");
        if e.to_string().contains("Cancelled") || e.to_string().contains("denied") {
            CaptureError::PermissionDenied
        } else {
            CaptureError::DBus(e)
        }
    })?;

    log::debug!("Screenshot request created: {request_path:?}");

    let request_proxy = RequestProxy::builder(&connection)
        .path(request_path.clone())
        .map_err(CaptureError::DBus)?
        .build()
        .await
        .map_err(CaptureError::DBus)?;

    let mut response_stream = request_proxy
        .receive_response()
        .await
        .map_err(CaptureError::DBus)?;

    let response_signal = response_stream
        .next()
        .await
        .ok_or_else(|| CaptureError::InvalidResponse("no Response signal received".to_string()))?;

    let args = response_signal
        .args()
        .map_err(|e| CaptureError::InvalidResponse(format!("failed to parse response args: {e}")))?;

    match args.response {
        0 => {
            let uri_value = args.results.get("uri").ok_or_else(|| {
                CaptureError::InvalidResponse("no 'uri' field in response".to_string())
            })?;

            let uri: &str = uri_value
                .downcast_ref()
                .map_err(|e| CaptureError::InvalidResponse(format!("URI is not a string: {e}")))?;

            log::info!("Screenshot captured: {uri}");
            Ok(uri.to_string())
        }
        1 => {
            log::warn!("Screenshot permission denied or cancelled by user");
            Err(CaptureError::PermissionDenied)
        }
        code => {
            log::error!("Portal screenshot failed with code {code}");
            Err(CaptureError::HostCapture(format!(
                "portal returned error code {code}"
            )))
        }
    }
}

/// Check whether the Screenshot portal is reachable on the session bus.
pub async fn is_portal_available() -> bool {
    match Connection::session().await {
        Ok(connection) => ScreenshotProxy::new(&connection).await.is_ok(),
        Err(_) => false,
    }
}
