use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};

use tailgate_core::error::TailgateError;
use tailgate_core::{CommitLog, Identity, ProfileRecord};

use crate::api::{
    ConsumeRequest, ConsumeResponse, CreateProfileRequest, CreateProfileResponse,
    DeleteProfileRequest, DeleteProfileResponse, ListProfilesRequest, ListProfilesResponse,
    ProduceRequest, ProduceResponse, Profile, ProfileLog, ReadProfileRequest, ReadProfileResponse,
    UpdateProfileRequest, UpdateProfileResponse,
};
use crate::app_state::AppState;
use crate::obs::GatewayMetrics;
use crate::policy::RpcMethod;
use crate::rpc::status::{invalid_argument, to_status};
use crate::transport::caller;

type RpcResult<T> = std::result::Result<Response<T>, Status>;

fn status(err: TailgateError) -> Status {
    to_status(&err)
}

/// gRPC façade over the profile store and the commit log.
///
/// Every handler authenticates (identity from the interceptor), authorizes through the gate,
/// and only then touches state.
#[derive(Clone)]
pub struct ProfileLogService {
    state: AppState,
}

impl ProfileLogService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn admit<T>(&self, request: &Request<T>, method: RpcMethod) -> Result<Identity, Status> {
        let identity = caller(request)?;
        tracing::debug!(method = method.as_str(), subject = %identity, "rpc");
        self.state.gate().authorize(&identity, method).map_err(status)?;
        Ok(identity)
    }

    fn call(&self, method: RpcMethod) -> Call {
        Call {
            metrics: self.state.metrics(),
            method,
            started: Instant::now(),
        }
    }
}

/// Records outcome and latency of one RPC (stream opens count once, at open).
struct Call {
    metrics: Arc<GatewayMetrics>,
    method: RpcMethod,
    started: Instant,
}

impl Call {
    fn finish<T>(self, result: RpcResult<T>) -> RpcResult<T> {
        let code = match &result {
            Ok(_) => "Ok".to_string(),
            Err(s) => format!("{:?}", s.code()),
        };
        let method = self.method.as_str();
        self.metrics
            .rpc_calls
            .inc(&[("method", method), ("code", code.as_str())]);
        self.metrics
            .rpc_duration
            .observe(&[("method", method)], self.started.elapsed());
        result
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, Status> {
    value.ok_or_else(|| invalid_argument(format!("{field} is required")))
}

#[tonic::async_trait]
impl ProfileLog for ProfileLogService {
    async fn create_profile(
        &self,
        request: Request<CreateProfileRequest>,
    ) -> RpcResult<CreateProfileResponse> {
        let call = self.call(RpcMethod::CreateProfile);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::CreateProfile)?;
            let profile = required(request.into_inner().profile, "profile")?;
            let stored = self
                .state
                .profiles()
                .create(ProfileRecord::from(profile))
                .await
                .map_err(status)?;
            Ok(Response::new(CreateProfileResponse {
                profile: Some(Profile::from(stored)),
            }))
        }
        .await;
        call.finish(result)
    }

    async fn read_profile(
        &self,
        request: Request<ReadProfileRequest>,
    ) -> RpcResult<ReadProfileResponse> {
        let call = self.call(RpcMethod::ReadProfile);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::ReadProfile)?;
            let id = request.into_inner().id;
            let found = self.state.profiles().read(&id).await.map_err(status)?;
            Ok(Response::new(ReadProfileResponse {
                profile: Some(Profile::from(found)),
            }))
        }
        .await;
        call.finish(result)
    }

    async fn update_profile(
        &self,
        request: Request<UpdateProfileRequest>,
    ) -> RpcResult<UpdateProfileResponse> {
        let call = self.call(RpcMethod::UpdateProfile);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::UpdateProfile)?;
            let profile = required(request.into_inner().profile, "profile")?;
            let stored = self
                .state
                .profiles()
                .update(ProfileRecord::from(profile))
                .await
                .map_err(status)?;
            Ok(Response::new(UpdateProfileResponse {
                profile: Some(Profile::from(stored)),
            }))
        }
        .await;
        call.finish(result)
    }

    async fn delete_profile(
        &self,
        request: Request<DeleteProfileRequest>,
    ) -> RpcResult<DeleteProfileResponse> {
        let call = self.call(RpcMethod::DeleteProfile);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::DeleteProfile)?;
            let id = request.into_inner().id;
            let deleted = self.state.profiles().delete(&id).await.map_err(status)?;
            Ok(Response::new(DeleteProfileResponse { deleted }))
        }
        .await;
        call.finish(result)
    }

    async fn list_profiles(
        &self,
        request: Request<ListProfilesRequest>,
    ) -> RpcResult<ListProfilesResponse> {
        let call = self.call(RpcMethod::ListProfiles);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::ListProfiles)?;
            let profiles = self.state.profiles().list().await.map_err(status)?;
            Ok(Response::new(ListProfilesResponse {
                profiles: profiles.into_iter().map(Profile::from).collect(),
            }))
        }
        .await;
        call.finish(result)
    }

    async fn produce(&self, request: Request<ProduceRequest>) -> RpcResult<ProduceResponse> {
        let call = self.call(RpcMethod::Produce);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::Produce)?;
            let record = required(request.into_inner().record, "record")?;
            let offset = self.state.log().append(record.value).map_err(status)?;
            Ok(Response::new(ProduceResponse { offset }))
        }
        .await;
        call.finish(result)
    }

    async fn consume(&self, request: Request<ConsumeRequest>) -> RpcResult<ConsumeResponse> {
        let call = self.call(RpcMethod::Consume);
        let result: RpcResult<_> = async {
            self.admit(&request, RpcMethod::Consume)?;
            let offset = request.into_inner().offset;
            let record = self.state.log().read(offset).map_err(status)?;
            Ok(Response::new(ConsumeResponse {
                record: Some(record.into()),
            }))
        }
        .await;
        call.finish(result)
    }

    type ProduceStreamStream = ReceiverStream<Result<ProduceResponse, Status>>;

    async fn produce_stream(
        &self,
        request: Request<Streaming<ProduceRequest>>,
    ) -> RpcResult<Self::ProduceStreamStream> {
        let call = self.call(RpcMethod::ProduceStream);
        let result = self.admit(&request, RpcMethod::ProduceStream).map(|identity| {
            let (tx, rx) = mpsc::channel(self.state.stream_buffer());
            tokio::spawn(pump_produce(
                identity,
                request.into_inner(),
                Arc::clone(self.state.log()),
                self.state.shutdown_token().child_token(),
                tx,
            ));
            Response::new(ReceiverStream::new(rx))
        });
        call.finish(result)
    }

    type ConsumeStreamStream =
        Pin<Box<dyn Stream<Item = Result<ConsumeResponse, Status>> + Send + 'static>>;

    async fn consume_stream(
        &self,
        request: Request<ConsumeRequest>,
    ) -> RpcResult<Self::ConsumeStreamStream> {
        let call = self.call(RpcMethod::ConsumeStream);
        let result = self.admit(&request, RpcMethod::ConsumeStream).map(|identity| {
            let offset = request.into_inner().offset;
            let tail = self
                .state
                .log()
                .tail(offset, self.state.shutdown_token().child_token());
            tracing::debug!(subject = %identity, offset, "tail opened");

            let records = tail.into_stream().map(|item| {
                item.map(|record| ConsumeResponse {
                    record: Some(record.into()),
                })
                .map_err(status)
            });
            let stream: Self::ConsumeStreamStream =
                Box::pin(TrackedStream::new(records, self.state.metrics()));
            Response::new(stream)
        });
        call.finish(result)
    }
}

/// Append each inbound record and ack its offset, in request order.
///
/// Ends cleanly at the end of input. Shutdown, an inbound read error, and a failed append all end
/// the stream with an error item so the client knows where appending stopped.
async fn pump_produce(
    identity: Identity,
    mut inbound: Streaming<ProduceRequest>,
    log: Arc<CommitLog>,
    shutdown: CancellationToken,
    tx: mpsc::Sender<Result<ProduceResponse, Status>>,
) {
    let mut acked = 0u64;
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                let draining = TailgateError::Unavailable("server shutting down".into());
                let _ = tx.send(Err(status(draining))).await;
                break;
            }
            next = inbound.message() => next,
        };

        let reply = match next {
            Ok(Some(req)) => match req.record {
                Some(record) => log
                    .append(record.value)
                    .map(|offset| ProduceResponse { offset })
                    .map_err(status),
                None => Err(invalid_argument("record is required")),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(subject = %identity, error = %e, "produce stream read failed");
                Err(e)
            }
        };

        let failed = reply.is_err();
        if tx.send(reply).await.is_err() {
            break;
        }
        if failed {
            break;
        }
        acked += 1;
    }
    tracing::debug!(subject = %identity, acked, "produce stream closed");
}

/// Response stream wrapper that keeps `tail_streams_active` accurate: +1 on open, -1 on drop
/// (end, client disconnect, or shutdown).
struct TrackedStream<S> {
    inner: Pin<Box<S>>,
    metrics: Arc<GatewayMetrics>,
}

impl<S> TrackedStream<S> {
    fn new(inner: S, metrics: Arc<GatewayMetrics>) -> Self {
        metrics.tail_streams_active.inc();
        Self {
            inner: Box::pin(inner),
            metrics,
        }
    }
}

impl<S: Stream> Stream for TrackedStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<S> Drop for TrackedStream<S> {
    fn drop(&mut self) {
        self.metrics.tail_streams_active.dec();
    }
}
