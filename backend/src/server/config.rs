//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::ports::SmsGateway;
use crate::outbound::persistence::pool::DbPool;
use crate::outbound::sms::DisabledSmsGateway;
use crate::outbound::token::JwtTokenService;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) tokens: JwtTokenService,
    pub(crate) sms_gateway: Arc<dyn SmsGateway>,
}

impl ServerConfig {
    /// Construct a server configuration over a live database pool.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, tokens: JwtTokenService) -> Self {
        Self {
            bind_addr,
            db_pool,
            tokens,
            sms_gateway: Arc::new(DisabledSmsGateway),
        }
    }

    /// Attach an outbound SMS gateway. Without one, send attempts fail
    /// with a configuration error rather than being dropped.
    #[must_use]
    pub fn with_sms_gateway(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.sms_gateway = gateway;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
