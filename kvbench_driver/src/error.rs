use kvbench_protocol::{ProtocolError, Reply};

quick_error! {
    #[derive(Debug)]
    pub enum ClientError {
        AddressError(address: String, err: std::io::Error) {
            display("invalid server address {}: {}", address, err)
        }
        ConnectionError(err: std::io::Error) {
            from()
            display("connection error: {}", err)
        }
        ProtocolError(err: ProtocolError) {
            from()
            display("protocol error: {}", err)
        }
        OperationError(command: &'static str, message: String) {
            display("{} failed: {}", command, message)
        }
        UnexpectedReply(command: &'static str, reply: Reply) {
            display("unexpected reply to {}: {:?}", command, reply)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
