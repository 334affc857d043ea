//! Desktop notifications via freedesktop D-Bus.

use std::collections::HashMap;
use zbus::{Connection, proxy};

/// D-Bus interface for freedesktop Notifications.
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Send one notification and wait for delivery.
pub async fn send(summary: &str, body: &str) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("failed to connect to session bus: {e}"))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("failed to create notifications proxy: {e}"))?;

    proxy
        .notify(
            "Snapgrab",
            0,
            "camera-photo",
            summary,
            body,
            vec![],
            HashMap::new(),
            3000,
        )
        .await
        .map_err(|e| format!("failed to send notification: {e}"))?;

    Ok(())
}

/// Fire-and-forget notification from async context; failures are logged.
pub fn send_in_background(summary: String, body: String) {
    tokio::spawn(async move {
        if let Err(e) = send(&summary, &body).await {
            log::warn!("notification failed: {e}");
        }
    });
}
