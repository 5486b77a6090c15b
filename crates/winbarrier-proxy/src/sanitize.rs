//! Request sanitization for calls that reach the host.

use winbarrier_common::CreateData;

/// Copy only the fields a remote caller may set on a new window.
///
/// `incognito` is forced off whatever the caller sent: a private window
/// could not be tracked and so could never be placed under access control.
/// `tabId` is dropped so a caller cannot pull someone else's tab into its
/// window.
pub fn sanitize_create(request: &CreateData) -> CreateData {
    CreateData {
        url: request.url.clone(),
        left: request.left,
        top: request.top,
        width: request.width,
        height: request.height,
        focused: request.focused,
        kind: request.kind,
        incognito: Some(false),
        tab_id: None,
    }
}
