//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> &'static str {
    r##"# winbarrier configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[proxy]
# source_path = "chrome.windows"            # "source" of every outgoing message
# allowed_methods = ["create", "getAll"]     # may only narrow this list
# command_queue = 32                         # 1-4096

[bus]
# capacity = 256                             # 1-65536 events per subscriber

[logging]
# level = "info"                             # trace, debug, info, warn, error
"##
}
