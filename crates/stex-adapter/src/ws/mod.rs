/*
[INPUT]:  Stream configuration and subscription channels
[OUTPUT]: Real-time market data and account events
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new channels or changing connection logic
*/

pub mod channels;
pub mod manager;
pub mod message;
pub mod registry;
pub mod socketio;
pub mod state;
pub mod transport;

pub use channels::{
    BalanceChannel, Channel, OrderBookChannel, RateChannel, UserOrderDeleteChannel,
    UserOrderFillChannel, UserOrderUpdateChannel,
};
pub use manager::{
    ChannelManager, ConnectionHandle, LifecycleCallbacks, SOCKET_URL, StreamConfig,
    SubscriptionHandle,
};
pub use message::{BalanceUpdate, GlassRow, OrderDeleted, OrderFill, OrderUpdate, RateMessage};
pub use registry::{EventHandler, HandlerId, HandlerRegistry};
pub use socketio::{Packet, SocketIoDialer, SocketIoSink};
pub use state::ConnectionState;
pub use transport::{
    Connection, Dialer, EventFrame, SocketSink, TransportConfig, TransportEvent,
};
