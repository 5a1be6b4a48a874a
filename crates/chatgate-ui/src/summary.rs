use chatgate_core::DeployRecord;
use std::path::Path;

/// Print the deploy summary.
pub fn print_summary(record: &DeployRecord, record_path: &Path) {
    let divider = "=".repeat(60);
    let name = &record.instance_name;
    let api_mode = if record.require_auth_on_api {
        "session required"
    } else {
        "open (page route gated only)"
    };

    println!("\n{divider}");
    println!("  Chat Bot Deployment Complete");
    println!("{divider}");
    println!("  Instance:          {name}");
    println!("  URL:               {}", record.url);
    println!("  OS User:           {}", record.os_user);
    println!("  Port:              127.0.0.1:{}", record.port);
    println!("  Project:           {}", record.project_root);
    println!("  TLS:               {}", if record.tls { "enabled" } else { "disabled" });
    println!();
    println!("  Password gate:     configured");
    println!("  Session secret:    configured");
    println!("  /api/chat access:  {api_mode}");
    println!("  Deploy Record:     {}", record_path.display());
    println!("{divider}");
    println!("  Next steps:");
    println!("    1. open {}", record.url);
    println!("    2. systemctl status {name}");
    println!("    3. journalctl -u {name} -f");
    println!("{divider}\n");
}
