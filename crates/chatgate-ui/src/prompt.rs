use crate::progress;
use chatgate_core::config::{
    is_safe_name, is_valid_domain, DEFAULT_SYSTEM_PROMPT, PORT_RANGE_END, PORT_RANGE_START,
};
use chatgate_core::secrets::{generate_secret, pick_free_port};
use chatgate_core::{AppError, DeploymentConfig};
use dialoguer::{Confirm, Input, Password};

fn safe_name(input: &String) -> Result<(), String> {
    if is_safe_name(input.trim()) {
        Ok(())
    } else {
        Err("use letters, digits, '_' or '-' (max 32 chars)".into())
    }
}

fn host_name(input: &String) -> Result<(), &'static str> {
    if is_valid_domain(input.trim()) {
        Ok(())
    } else {
        Err("use a bare host name: letters, digits, '.' and '-'")
    }
}

fn non_empty(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("a value is required")
    } else {
        Ok(())
    }
}

fn port_or_blank(input: &String) -> Result<(), String> {
    parse_port(input).map(|_| ()).map_err(|e| e.to_string())
}

/// Parse operator port input. Blank means "pick one for me".
pub fn parse_port(input: &str) -> Result<Option<u16>, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u16>() {
        Ok(0) | Err(_) => Err(AppError::InvalidConfig(format!(
            "'{input}' is not a port in 1-65535"
        ))),
        Ok(port) => Ok(Some(port)),
    }
}

/// A blank answer gets a freshly generated secret.
pub fn secret_or_generated(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        generate_secret()
    } else {
        input.to_string()
    }
}

/// Interactively gather every deployment parameter.
pub fn collect() -> Result<DeploymentConfig, anyhow::Error> {
    let instance_name: String = Input::new()
        .with_prompt("Instance name (service/site name)")
        .default("chatbot".to_string())
        .validate_with(safe_name)
        .interact_text()?;

    let domain: String = Input::new()
        .with_prompt("Domain (e.g. chat.example.com)")
        .validate_with(host_name)
        .interact_text()?;

    let os_user: String = Input::new()
        .with_prompt("OS user to run the bot")
        .default(instance_name.clone())
        .validate_with(safe_name)
        .interact_text()?;

    let api_key = Password::new().with_prompt("OpenAI API key").interact()?;

    let gate_password = Password::new()
        .with_prompt("Password visitors must enter")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let system_prompt: String = Input::new()
        .with_prompt("System prompt (use \\n for line breaks)")
        .default(DEFAULT_SYSTEM_PROMPT.to_string())
        .interact_text()?;

    let session_secret = Password::new()
        .with_prompt("Session signing secret (blank to generate)")
        .allow_empty_password(true)
        .interact()?;
    let session_secret = secret_or_generated(&session_secret);

    let port_input: String = Input::new()
        .with_prompt(format!(
            "Port (blank for random {PORT_RANGE_START}-{PORT_RANGE_END})"
        ))
        .allow_empty(true)
        .validate_with(port_or_blank)
        .interact_text()?;
    let port = match parse_port(&port_input)? {
        Some(port) => port,
        None => {
            let port = pick_free_port()?;
            progress::detail(&format!("Selected free port {port}"));
            port
        }
    };

    let tls_email = if Confirm::new()
        .with_prompt("Obtain a TLS certificate with certbot?")
        .default(true)
        .interact()?
    {
        let email: String = Input::new()
            .with_prompt("Contact email for the certificate authority")
            .validate_with(non_empty)
            .interact_text()?;
        Some(email.trim().to_string())
    } else {
        None
    };

    let require_auth_on_api = Confirm::new()
        .with_prompt("Require a logged-in session for /api/chat?")
        .default(false)
        .interact()?;

    let cfg = DeploymentConfig {
        instance_name: instance_name.trim().to_string(),
        domain: domain.trim().to_string(),
        os_user: os_user.trim().to_string(),
        api_key: api_key.trim().to_string(),
        gate_password,
        system_prompt,
        session_secret,
        port,
        tls_email,
        require_auth_on_api,
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_port_means_auto() {
        assert_eq!(parse_port("  ").unwrap(), None);
        assert_eq!(parse_port("8080").unwrap(), Some(8080));
    }

    #[test]
    fn bad_ports_are_rejected() {
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn domain_prompt_rejects_nginx_syntax() {
        assert!(host_name(&" chat.example.com ".to_string()).is_ok());
        assert!(host_name(&"x.com; }".to_string()).is_err());
    }

    #[test]
    fn blank_secret_is_generated() {
        let s = secret_or_generated("");
        assert_eq!(s.len(), 32);
        assert_eq!(secret_or_generated(" mine "), "mine");
    }
}
