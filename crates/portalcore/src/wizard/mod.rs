//! Portal setup wizard: a three-step conversation that collects a public
//! channel, a private group and an optional welcome message, verifying the
//! bot's admin rights in both chats before the portal is stored.

pub mod classifier;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod store;
pub mod sweeper;
pub mod types;
pub mod verifier;

pub use classifier::{classify, Classified};
pub use orchestrator::{Dispatch, WizardConfig, WizardOrchestrator};
pub use prompt::Prompt;
pub use session::{StepError, Transition, WizardSession, WizardStep};
pub use store::{ExpiryNotice, SessionHandle, SessionStore};
pub use sweeper::start_sweeper;
pub use types::{ChatKind, ChatRef, ForwardedChat, IncomingMessage, OwnerId, ResolvedChat};
pub use verifier::{
    ChatAdminVerifier, ChatMemberInfo, ChatTransport, MemberStatus, PermissionFlag, TransportFailure,
    VerificationResult, VerifyError,
};
