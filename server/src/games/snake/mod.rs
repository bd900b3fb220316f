mod session;
mod view;

pub use session::{GameSession, SessionCommand};
pub use view::{GameOverView, GameView, ViewEvent, ViewerCommand};
