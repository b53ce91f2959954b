//! Session runtime for the BioView molecular viewer.
//!
//! This crate owns everything with a lifecycle:
//!
//! - [`Session`]: one renderer surface, its readiness handshake, and the
//!   outbound load channel
//! - [`SessionRegistry`]: the single "current session" pointer
//! - [`Surface`] / [`SurfaceFactory`]: the seam to whatever hosts the renderer,
//!   with a child-process implementation ([`ProcessSurfaceFactory`]) and an
//!   in-process one ([`MemorySurfaceFactory`])
//! - [`PipeTransport`]: length-prefixed JSON framing for the process host
//!
//! Wire types come from `bioview-protocol`.

pub mod error;
pub mod memory;
pub mod notify;
pub mod process;
pub mod readiness;
pub mod registry;
pub mod session;
pub mod surface;
pub mod transport;

pub use error::{Error, Result};
pub use memory::{MemoryHost, MemorySurface, MemorySurfaceFactory};
pub use notify::{LogNotifier, Notifier};
pub use process::{ProcessSurface, ProcessSurfaceFactory};
pub use readiness::{Readiness, ReadySignal};
pub use registry::SessionRegistry;
pub use session::{Session, SessionContext, SessionId, SessionState};
pub use surface::{Surface, SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceParts};
pub use transport::{MAX_FRAME_BYTES, PipeTransport, PipeTransportReceiver, PipeTransportSender};
