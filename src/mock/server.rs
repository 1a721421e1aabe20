use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use kvbench_protocol::{
    read_message, send_reply, Command, ProtocolError, ReadBuffer, Reply, WriteBuffer,
};
use log::{error, info, warn};

use super::mem_store::MemStore;
use crate::error::Result;

/// A blocking RESP server over a `MemStore`, one thread per connection.
pub struct MockServer {
    listener: TcpListener,
    store: Arc<MemStore>,
}

impl MockServer {
    pub fn new(address: &str, store: MemStore) -> Result<MockServer> {
        let listener = TcpListener::bind(address)?;

        Ok(MockServer {
            listener,
            store: Arc::new(store),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn store(&self) -> Arc<MemStore> {
        self.store.clone()
    }

    pub fn run(self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = stream?;
            let store = self.store.clone();

            thread::Builder::new()
                .name(String::from("mock_connection"))
                .spawn(move || {
                    if let Err(err) = handle_stream(stream, store) {
                        warn!("Connection dropped: {}", err);
                    }
                })?;
        }

        Ok(())
    }

    /// Runs the accept loop on a background thread and returns the bound address.
    pub fn spawn(self) -> Result<SocketAddr> {
        let addr = self.local_addr()?;

        thread::Builder::new()
            .name(String::from("mock_server"))
            .spawn(move || {
                if let Err(err) = self.run() {
                    error!("Mock server stopped: {}", err);
                }
            })?;

        info!("Mock server listening on {}", addr);
        Ok(addr)
    }
}

fn handle_stream(stream: TcpStream, store: Arc<MemStore>) -> kvbench_protocol::Result<()> {
    let remote_addr = stream.peer_addr()?;
    info!("Accepting stream from: {}", remote_addr);
    stream.set_nodelay(true)?;

    let mut reader = ReadBuffer::new(stream.try_clone()?);
    let mut writer = WriteBuffer::new(stream);
    loop {
        let message = match read_message(&mut reader) {
            Ok(message) => message,
            Err(ProtocolError::ConnectionClosed) => break,
            Err(err) => {
                // the stream is out of sync, nothing after this can be trusted
                send_reply(&mut writer, Reply::error(format!("ERR Protocol error: {}", err)))?;
                return Err(err);
            }
        };

        let reply = match Command::from_message(message) {
            Ok(command) => store.execute(command),
            Err(err) => Reply::error(format!("ERR {}", err)),
        };
        send_reply(&mut writer, reply)?;
    }

    info!("Closing stream from: {}", remote_addr);
    Ok(())
}
