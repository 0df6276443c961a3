mod agent;
pub mod encoding;
pub mod network;
mod policy;
mod random;
mod td;
mod value;

pub use agent::{Agent, TrainableAgent, Transition};
pub use encoding::{encode, FeatureLayout, Features, NUM_FEATURES};
pub use network::{NeuralValue, ValueNetwork, ValueNetworkConfig};
pub use policy::{epsilon_greedy_index, greedy_index, Policy};
pub use random::RandomAgent;
pub use td::{TdAgent, TdConfig};
pub use value::ValueFunction;
