mod param;
pub use param::StackParameter;

mod params;
pub use params::ParameterSet;

mod spec;
pub use spec::StackSpec;

mod request;
pub use request::StackRequest;

mod status;
pub use status::{StackState, StackStatus};

mod outputs;
pub use outputs::StackOutputs;

mod error;
pub use error::{ModelError, ModelResult};
