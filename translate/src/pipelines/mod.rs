pub mod grpc;
pub mod http;
pub mod tcp;
pub mod tls;
pub mod udp;
