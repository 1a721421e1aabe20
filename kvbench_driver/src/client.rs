use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use kvbench_protocol::{
    read_reply, Command, GetCommand, LrangeCommand, ReadBuffer, Reply, RpushCommand, SetCommand,
    Slice, WriteBuffer,
};
use log::{debug, info};

use super::commands::Commands;
use super::error::{ClientError, Result};

/// A single blocking connection. One request is in flight at a time: every call
/// writes its command and waits for the matching reply before returning.
///
/// Dropping the client closes the socket.
pub struct KvClient {
    peer_addr: SocketAddr,
    reader: ReadBuffer<TcpStream>,
    writer: WriteBuffer<TcpStream>,
}

impl KvClient {
    /// Connects to `address`, given as `host:port`. Every resolved address is
    /// tried in turn.
    pub fn connect(address: &str) -> Result<KvClient> {
        let addrs: Vec<SocketAddr> = address
            .to_socket_addrs()
            .map_err(|err| ClientError::AddressError(address.to_string(), err))?
            .collect();
        if addrs.is_empty() {
            let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved");
            return Err(ClientError::AddressError(address.to_string(), err));
        }

        let stream = TcpStream::connect(&addrs[..])?;
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr()?;

        let reader = ReadBuffer::new(stream.try_clone()?);
        let writer = WriteBuffer::new(stream);
        info!("Connected to {} ({})", address, peer_addr);

        Ok(KvClient {
            peer_addr,
            reader,
            writer,
        })
    }

    /// Sends one command and returns its reply. An error reply from the server
    /// becomes `ClientError::OperationError`.
    pub fn send(&mut self, command: Command) -> Result<Reply> {
        let name = command.name();
        let message: Vec<u8> = command.into();
        self.writer.write_all(&message)?;

        match read_reply(&mut self.reader)? {
            Reply::ErrorReply(message) => Err(ClientError::OperationError(name, message)),
            reply => Ok(reply),
        }
    }

    pub fn close(self) -> Result<()> {
        self.writer.get_ref().shutdown(Shutdown::Both)?;
        debug!("Closed connection to {}", self.peer_addr);
        Ok(())
    }
}

fn expect_status(command: &'static str, reply: Reply) -> Result<()> {
    match reply {
        Reply::StatusReply(_) => Ok(()),
        reply => Err(ClientError::UnexpectedReply(command, reply)),
    }
}

impl Commands for KvClient {
    fn get(&mut self, key: &Slice) -> Result<Option<Slice>> {
        match self.send(Command::GET(GetCommand { key: key.clone() }))? {
            Reply::BulkReply(value) => Ok(value),
            reply => Err(ClientError::UnexpectedReply("GET", reply)),
        }
    }

    fn set(&mut self, key: &Slice, value: &Slice) -> Result<()> {
        let reply = self.send(Command::SET(SetCommand {
            key: key.clone(),
            value: value.clone(),
        }))?;
        expect_status("SET", reply)
    }

    fn rpush(&mut self, key: &Slice, value: &Slice) -> Result<i64> {
        match self.send(Command::RPUSH(RpushCommand {
            key: key.clone(),
            value: value.clone(),
        }))? {
            Reply::IntegerReply(len) => Ok(len),
            reply => Err(ClientError::UnexpectedReply("RPUSH", reply)),
        }
    }

    fn lrange(&mut self, key: &Slice, start: i64, stop: i64) -> Result<Vec<Slice>> {
        let reply = self.send(Command::LRANGE(LrangeCommand {
            key: key.clone(),
            start,
            stop,
        }))?;

        match reply {
            Reply::MultiBulkReply(None) => Ok(Vec::new()),
            Reply::MultiBulkReply(Some(items)) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Reply::BulkReply(Some(value)) => values.push(value),
                        item => return Err(ClientError::UnexpectedReply("LRANGE", item)),
                    }
                }
                Ok(values)
            }
            reply => Err(ClientError::UnexpectedReply("LRANGE", reply)),
        }
    }

    fn flushdb(&mut self) -> Result<()> {
        let reply = self.send(Command::FLUSHDB)?;
        expect_status("FLUSHDB", reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbench_protocol::{read_message, ProtocolError};
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::Once;
    use std::thread::JoinHandle;

    static INIT: Once = Once::new();

    fn init() {
        INIT.call_once(|| {
            env_logger::init();
        });
    }

    /// Accepts one connection and answers each request with the next canned
    /// reply. Returns the address and a handle yielding the requests it saw.
    fn serve(replies: Vec<&'static [u8]>) -> (String, JoinHandle<Vec<Vec<Vec<u8>>>>) {
        init();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut reader = ReadBuffer::new(stream);

            let mut requests = Vec::new();
            for reply in replies {
                requests.push(read_message(&mut reader).unwrap());
                writer.write_all(reply).unwrap();
            }
            requests
        });

        (address, handle)
    }

    fn parts(parts: &[&str]) -> Vec<Vec<u8>> {
        parts.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    #[test]
    fn get_value_and_nil() {
        let (address, server) = serve(vec![&b"$3\r\nbar\r\n"[..], &b"$-1\r\n"[..]]);
        let mut client = KvClient::connect(&address).unwrap();

        assert_eq!(
            client.get(&Slice::from("foo")).unwrap(),
            Some(Slice::from("bar"))
        );
        assert_eq!(client.get(&Slice::from("missing")).unwrap(), None);
        client.close().unwrap();

        let requests = server.join().unwrap();
        assert_eq!(
            requests,
            vec![parts(&["GET", "foo"]), parts(&["GET", "missing"])]
        );
    }

    #[test]
    fn list_operations() {
        let (address, server) = serve(vec![
            &b":1\r\n"[..],
            &b":2\r\n"[..],
            &b"*2\r\n$1\r\n0\r\n$1\r\n1\r\n"[..],
            &b"+OK\r\n"[..],
        ]);
        let mut client = KvClient::connect(&address).unwrap();
        let key = Slice::from("list");

        assert_eq!(client.rpush(&key, &Slice::from(0i64)).unwrap(), 1);
        assert_eq!(client.rpush(&key, &Slice::from(1i64)).unwrap(), 2);
        assert_eq!(
            client.lrange(&key, 0, 50).unwrap(),
            vec![Slice::from("0"), Slice::from("1")]
        );
        client.flushdb().unwrap();

        let requests = server.join().unwrap();
        assert_eq!(
            requests,
            vec![
                parts(&["RPUSH", "list", "0"]),
                parts(&["RPUSH", "list", "1"]),
                parts(&["LRANGE", "list", "0", "50"]),
                parts(&["FLUSHDB"]),
            ]
        );
    }

    #[test]
    fn error_reply_is_operation_error() {
        let (address, server) = serve(vec![
            &b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n"[..],
            &b"+OK\r\n"[..],
        ]);
        let mut client = KvClient::connect(&address).unwrap();

        match client.get(&Slice::from("list")) {
            Err(ClientError::OperationError(command, message)) => {
                assert_eq!(command, "GET");
                assert!(message.starts_with("WRONGTYPE"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        // The connection stays in sync after an error reply.
        client.set(&Slice::from("k"), &Slice::from("v")).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn wrong_reply_shape() {
        let (address, server) = serve(vec![&b"+OK\r\n"[..], &b"*1\r\n:1\r\n"[..]]);
        let mut client = KvClient::connect(&address).unwrap();

        match client.rpush(&Slice::from("list"), &Slice::from("x")) {
            Err(ClientError::UnexpectedReply("RPUSH", Reply::StatusReply(_))) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match client.lrange(&Slice::from("list"), 0, -1) {
            Err(ClientError::UnexpectedReply("LRANGE", Reply::IntegerReply(1))) => {}
            other => panic!("unexpected result {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn server_hangup_is_protocol_error() {
        let (address, server) = serve(vec![]);
        let mut client = KvClient::connect(&address).unwrap();
        server.join().unwrap();

        match client.flushdb() {
            Err(ClientError::ProtocolError(ProtocolError::ConnectionClosed))
            | Err(ClientError::ProtocolError(ProtocolError::IOError(_))) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn bad_address() {
        match KvClient::connect("not an address") {
            Err(ClientError::AddressError(address, _)) => assert_eq!(address, "not an address"),
            Err(err) => panic!("unexpected error {:?}", err),
            Ok(_) => panic!("connected to an invalid address"),
        }
    }

    #[test]
    fn connect_by_host_name() {
        let (address, server) = serve(vec![&b"+OK\r\n"[..]]);
        let port = address.rsplit(':').next().unwrap();
        let mut client = KvClient::connect(&format!("localhost:{}", port)).unwrap();

        client.flushdb().unwrap();
        client.close().unwrap();
        assert_eq!(server.join().unwrap(), vec![parts(&["FLUSHDB"])]);
    }

    #[test]
    fn connection_refused() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().to_string()
        };

        match KvClient::connect(&address) {
            Err(ClientError::ConnectionError(_)) => {}
            Err(err) => panic!("unexpected error {:?}", err),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
