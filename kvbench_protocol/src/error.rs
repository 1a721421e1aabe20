quick_error! {
    #[derive(Debug)]
    pub enum ProtocolError {
        GrammarCheckFailed(s: &'static str) {
            description(s)
            display("{}", s)
        }
        ConnectionClosed {
            display("connection closed by peer")
        }
        CommandNotSupport(s: String) {
            display("Command {} is not supported", s)
        }
        Utf8Error(err: std::str::Utf8Error) {
            from()
            display("invalid utf-8 in message: {}", err)
        }
        ParseError(err: std::num::ParseIntError) {
            from()
            display("invalid integer in message: {}", err)
        }
        IOError(err: std::io::Error) {
            from()
            display("io error: {}", err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
