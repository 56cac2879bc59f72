pub mod assets;
pub mod game_tester;
pub mod learner;
pub mod reports;
pub mod tester;

pub use assets::TesterAssets;
pub use game_tester::{GameTester, SimulationPlan, SimulationSummary};
pub use learner::LearnerProfile;
pub use tester::*;
