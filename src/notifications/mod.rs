mod email;

pub use email::SystemEmailService;
