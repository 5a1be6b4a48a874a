use crate::config::{PORT_PICK_ATTEMPTS, PORT_RANGE_END, PORT_RANGE_START};
use crate::error::AppError;
use rand::Rng;
use std::net::{Ipv4Addr, TcpListener};

/// 16 bytes from the thread CSPRNG as 32 lowercase hex characters.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// True if nothing is listening on `port`, on either the wildcard or the
/// loopback address.
pub fn port_is_free(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok()
        && TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
}

/// Sample random ports from the auto-assignment range until a free one turns up.
pub fn pick_free_port() -> Result<u16, AppError> {
    let mut rng = rand::rng();
    pick_port_with(
        || rng.random_range(PORT_RANGE_START..=PORT_RANGE_END),
        port_is_free,
        PORT_PICK_ATTEMPTS,
    )
}

/// Core of [`pick_free_port`] with the sampler and probe injected.
pub fn pick_port_with(
    mut sample: impl FnMut() -> u16,
    mut is_free: impl FnMut(u16) -> bool,
    attempts: u32,
) -> Result<u16, AppError> {
    for _ in 0..attempts {
        let port = sample();
        if is_free(port) {
            return Ok(port);
        }
    }
    Err(AppError::NoFreePort {
        start: PORT_RANGE_START,
        end: PORT_RANGE_END,
        attempts,
    })
}
