//! Middleware stack para el servidor HTTP.
//!
//! Este modulo contiene los middleware de Tower:
//! - `IdentityLayer`: resuelve el `ClientIdentity` de cada request
//! - `ResponseTimeLayer`: X-Response-Time y logging estructurado de requests
//! - `ThrottleLayer`: rechaza con 429 cuando una ventana esta llena
//! - `ThrottleInfoLayer`: agrega los headers X-Throttle-*

mod identity;
mod response_time;
mod throttle;

pub use identity::{IdentityLayer, IdentityMiddleware};
pub use response_time::{RESPONSE_TIME_HEADER, ResponseTimeLayer, ResponseTimeMiddleware};
pub use throttle::{ThrottleInfoLayer, ThrottleInfoMiddleware, ThrottleLayer, ThrottleMiddleware};
