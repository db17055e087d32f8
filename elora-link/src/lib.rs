pub mod inbound;
pub mod proxy;
pub mod share_link;
pub mod subscription;
