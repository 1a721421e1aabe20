use kvbench_driver::ClientError;

quick_error! {
    #[derive(Debug)]
    pub enum BenchError {
        ClientError(err: ClientError) {
            from()
            display("{}", err)
            cause(err)
        }
        InvalidConfig(s: String) {
            display("invalid configuration: {}", s)
        }
        ArgumentError(err: clap::Error) {
            from()
            display("{}", err)
        }
        IOError(err: std::io::Error) {
            from()
            display("io error: {}", err)
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
