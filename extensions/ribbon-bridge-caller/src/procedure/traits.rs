use crate::{ProcedureDescriptor, RibbonCallerInterface, error::RibbonCallerError};
use ribbon_bridge::hash::procedure_id_hash;
use std::io;

// Optional helper traits that couple a procedure or broadcast name with the
// payload codec used for it. The core correlator only ever sees bytes; these
// traits let application crates write `SendRobotPing::call(&client, input)`
// and keep serialization in one place per definition.

/// A server procedure with typed arguments and result.
pub trait RibbonProcedure {
    /// Name as exposed by the server. Its hash is the wire id.
    const NAME: &'static str;

    const PROCEDURE_ID: u32 = procedure_id_hash(Self::NAME);

    type Input;

    type Output;

    fn encode_args(input: Self::Input) -> Result<Vec<u8>, io::Error>;

    fn decode_result(bytes: &[u8]) -> Result<Self::Output, io::Error>;

    /// Registry entry for this procedure. Schemas default to unspecified.
    fn descriptor() -> ProcedureDescriptor {
        ProcedureDescriptor::new(Self::NAME)
    }
}

/// Calls a [`RibbonProcedure`] through any [`RibbonCallerInterface`].
#[async_trait::async_trait]
pub trait RibbonCallProcedure: RibbonProcedure + Sized + Send + Sync {
    async fn call<C: RibbonCallerInterface + Send + Sync>(
        client: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RibbonCallerError>;
}

#[async_trait::async_trait]
impl<T> RibbonCallProcedure for T
where
    T: RibbonProcedure + Send + Sync + 'static,
    T::Input: Send + 'static,
    T::Output: Send + 'static,
{
    async fn call<C: RibbonCallerInterface + Send + Sync>(
        client: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RibbonCallerError> {
        let args = Self::encode_args(input).map_err(RibbonCallerError::Codec)?;

        let payload = client.call(Self::NAME, args).await?;

        Self::decode_result(&payload).map_err(RibbonCallerError::Codec)
    }
}

/// A server-originated event with a typed payload.
pub trait RibbonBroadcast {
    const NAME: &'static str;

    const TOPIC_ID: u32 = procedure_id_hash(Self::NAME);

    type Payload;

    fn decode(bytes: &[u8]) -> Result<Self::Payload, io::Error>;
}

/// Registers typed handlers for a [`RibbonBroadcast`].
///
/// Payloads that fail to decode count as handler failures: they are logged
/// and do not reach `handler`.
#[async_trait::async_trait]
pub trait RibbonSubscribeBroadcast: RibbonBroadcast + Sized + Send + Sync {
    async fn subscribe<C, F>(client: &C, handler: F)
    where
        C: RibbonCallerInterface + Send + Sync,
        F: Fn(Self::Payload) + Send + Sync + 'static;

    async fn unsubscribe<C: RibbonCallerInterface + Send + Sync>(client: &C) -> bool {
        client.remove_broadcast_handler(Self::NAME).await
    }
}

#[async_trait::async_trait]
impl<T> RibbonSubscribeBroadcast for T
where
    T: RibbonBroadcast + Send + Sync + 'static,
    T::Payload: Send + 'static,
{
    async fn subscribe<C, F>(client: &C, handler: F)
    where
        C: RibbonCallerInterface + Send + Sync,
        F: Fn(Self::Payload) + Send + Sync + 'static,
    {
        client
            .add_broadcast_handler(Self::NAME, move |bytes: &[u8]| {
                let payload = Self::decode(bytes)?;
                handler(payload);
                Ok(())
            })
            .await
    }
}
