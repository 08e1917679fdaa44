pub mod subscription_gate;

pub use subscription_gate::subscription_gate_middleware;
