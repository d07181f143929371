use example_ribbon_bridge_service_definition::{
    broadcasts::Alert,
    procedures::{RobotPing, SendRobotPing},
};
use example_ribbon_bridge_ws_app::{
    LoopbackServer,
    utils::{bind_tcp_listener_on_random_port, tcp_listener_to_ws_url},
};
use ribbon_bridge_caller::{
    ProcedureRegistry, RibbonCallerInterface,
    procedure::{RibbonCallProcedure, RibbonSubscribeBroadcast},
};
use ribbon_bridge_tokio_client::RibbonClient;
use std::sync::Arc;
use tokio::join;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (listener, _port) = bind_tcp_listener_on_random_port().await?;
    let url = tcp_listener_to_ws_url(&listener)?;

    let _server_task = tokio::spawn(async move {
        let _ = Arc::new(LoopbackServer::new())
            .serve_with_listener(listener)
            .await;
    });

    let registry = ProcedureRegistry::from_json_str(&LoopbackServer::schema_document())?;
    println!("Server procedures: {:?}", registry.procedures());

    let client = RibbonClient::new(&url)
        .await?
        .with_procedure_registry(registry);

    client.set_state_change_handler(|state| {
        println!("Transport state: {:?}", state);
    });

    let versions = client.connect().await?;
    println!("Connected: {}", versions);

    Alert::subscribe(&client, |text| {
        println!("Alert: {}", text);
    })
    .await;

    // `join!` waits for every reply before proceeding.
    let (pong, robot, alert) = join!(
        client.call("ping", Vec::new()),
        SendRobotPing::call(
            &client,
            RobotPing {
                sequence: 1,
                message: "hello".into(),
            }
        ),
        client.call("triggerAlert", b"battery low".to_vec()),
    );

    println!("Result from ping(): {:?}", String::from_utf8_lossy(&pong?));
    println!("Result from sendRobotPing(): {:?}", robot?);
    alert?;

    let cancelled = client.disconnect().await?;
    println!("Disconnected ({} calls cancelled)", cancelled);

    Ok(())
}
