use anyhow::{Context, Result};
use chatgate_core::{AppError, HostPaths};
use chatgate_provision::{HostShell, ProvisionOpts};
use chatgate_ui::{prompt, summary};
use console::style;

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

/// Collect parameters, provision the host, and print the summary.
pub async fn run() -> Result<()> {
    if !is_root() {
        return Err(AppError::NotRoot.into());
    }

    println!("{}", style("chatgate: password-gated chat bot installer").bold());
    println!("Press Enter to accept a [default].\n");

    let cfg = prompt::collect()?;
    let exe = std::env::current_exe().context("Cannot locate the running chatgate binary")?;
    let paths = HostPaths::default();
    let opts = ProvisionOpts {
        paths: &paths,
        runtime_source: &exe,
    };

    match chatgate_provision::run(&HostShell, &cfg, &opts).await {
        Ok((record, record_path)) => {
            summary::print_summary(&record, &record_path);
            Ok(())
        }
        Err(e) => Err(deploy_failed(&cfg.instance_name, e)),
    }
}

/// Print recovery advice and wrap the cause for the exit report.
fn deploy_failed(instance_name: &str, err: AppError) -> anyhow::Error {
    eprintln!("\n{}", style("Deploy failed.").red().bold());
    eprintln!("Steps completed before the failure were left in place.");
    eprintln!("Fix the cause and re-run `chatgate deploy`; every step is safe to repeat.\n");
    anyhow::Error::new(err).context(format!("Deploy of '{instance_name}' failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_the_cause_once() {
        let err = deploy_failed("helpbot", AppError::Postcondition("nginx -t failed".into()));
        assert_eq!(err.to_string(), "Deploy of 'helpbot' failed");
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        assert_eq!(chain.len(), 2);
        assert!(chain[1].contains("nginx -t failed"));
    }
}
