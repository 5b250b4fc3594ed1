//! Saga coordinator for orchestrating the order fulfillment saga.

use std::time::Instant;

use domain::{CreateOrderRequest, CreateOrderResponse, PaymentStatus};
use ledger::{LedgerStore, fields};

use crate::aggregate::SagaInstance;
use crate::config::SagaConfig;
use crate::error::SagaError;
use crate::events::{Compensation, SagaEvent};
use crate::order_fulfillment::{
    SAGA_TYPE, STEP_CANCEL_SHIPMENT, STEP_CHARGE_CUSTOMER, STEP_REFUND_CUSTOMER, STEP_SHIPMENT,
    STEP_VALIDATE_ORDER,
};
use crate::outcome::{SagaOutcome, SagaResult};
use crate::services::invoker::StepInvoker;
use crate::services::publisher::EventPublisher;
use crate::stage::Stage;
use crate::state::SagaState;

/// Result of the charge stage.
enum ChargeDecision {
    Paid {
        payload: Vec<u8>,
        response: CreateOrderResponse,
    },
    Pending {
        payload: Vec<u8>,
    },
}

/// Orchestrates order fulfillment sagas.
///
/// The coordinator drives validate → announce → charge → persist bill →
/// announce → ship → persist shipment → announce, strictly in sequence,
/// each step consuming the previous step's output. Collaborators are
/// injected at construction and shared by every saga it runs.
pub struct SagaCoordinator<I, P, L>
where
    I: StepInvoker,
    P: EventPublisher,
    L: LedgerStore,
{
    invoker: I,
    publisher: P,
    ledger: L,
    config: SagaConfig,
}

impl<I, P, L> SagaCoordinator<I, P, L>
where
    I: StepInvoker,
    P: EventPublisher,
    L: LedgerStore,
{
    /// Creates a coordinator with the default configuration.
    pub fn new(invoker: I, publisher: P, ledger: L) -> Self {
        Self::with_config(invoker, publisher, ledger, SagaConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    pub fn with_config(invoker: I, publisher: P, ledger: L, config: SagaConfig) -> Self {
        Self {
            invoker,
            publisher,
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Returns the ledger the coordinator writes to.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Executes the fulfillment saga for `request`.
    ///
    /// Returns the finished saga when it completes or stops on a pending
    /// charge. Any other ending is an error naming the stage that failed.
    #[tracing::instrument(
        skip(self, request),
        fields(saga_type = SAGA_TYPE, order_id = %request.order_id())
    )]
    pub async fn execute_saga(&self, request: &CreateOrderRequest) -> Result<SagaOutcome, SagaError> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();

        let mut saga = SagaInstance::start(request.order_id().clone());
        let result = match request.validate() {
            Ok(()) => self.run_steps(&mut saga, request).await,
            Err(e) => Err(SagaError::from(e)),
        };

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);

        match result {
            Ok(result) => {
                match &result {
                    SagaResult::Completed { .. } => {
                        metrics::counter!("saga_completed").increment(1);
                        tracing::info!(duration, "saga completed successfully");
                    }
                    SagaResult::PaymentPending { .. } => {
                        metrics::counter!("saga_pending").increment(1);
                        tracing::info!(duration, "saga stopped on pending payment");
                    }
                }
                Ok(SagaOutcome { saga, result })
            }
            Err(error) => {
                self.abort(&mut saga, &error).await;
                Err(error)
            }
        }
    }

    async fn run_steps(
        &self,
        saga: &mut SagaInstance,
        request: &CreateOrderRequest,
    ) -> Result<SagaResult, SagaError> {
        let order_id = request.order_id().as_str();

        // 1. Validate
        let payload = serde_json::to_vec(request).map_err(|e| Stage::Payload.fail(e))?;
        saga.advance(SagaState::Validating)?;
        let validated = self
            .invoke_step(Stage::Validate, STEP_VALIDATE_ORDER, payload)
            .await?;
        saga.complete_step(Stage::Validate, None);
        saga.advance(SagaState::Validated)?;

        // 2. Announce creation
        self.announce(
            Stage::NotifyCreation,
            &self.config.topics.order_creation,
            &validated,
        )
        .await?;
        saga.complete_step(Stage::NotifyCreation, None);

        // 3-4. Charge and interpret the payment status
        let (charged, charge) = match self.charge(saga, &validated).await? {
            ChargeDecision::Paid { payload, response } => (payload, response),
            ChargeDecision::Pending { payload } => {
                return Ok(SagaResult::PaymentPending { payload });
            }
        };

        // 5. Persist bill
        let bill = fields([
            ("OrderId", order_id),
            ("TransactionAmount", charge.order.order_total.amount.as_str()),
            ("CardNumber", charge.payment.card_number.as_str()),
            (
                "ChargeTimeStamp",
                charge.payment.charge_customer_timestamp.as_str(),
            ),
            ("Currency", charge.order.order_total.currency_code.as_str()),
        ]);
        self.persist(
            Stage::PersistBill,
            &self.config.collections.bill_history,
            order_id,
            bill,
        )
        .await?;
        saga.complete_step(Stage::PersistBill, None);
        saga.advance(SagaState::BillPersisted)?;

        // 6. Announce payment
        self.announce(
            Stage::NotifyPayment,
            &self.config.topics.order_payment,
            &charged,
        )
        .await?;
        saga.complete_step(Stage::NotifyPayment, None);
        saga.advance(SagaState::PaymentNotified)?;

        // 7-8. Ship and interpret the shipment result
        saga.advance(SagaState::Shipping)?;
        let shipped = self
            .invoke_step(Stage::Shipment, STEP_SHIPMENT, charged.clone())
            .await?;
        let shipment: CreateOrderResponse =
            serde_json::from_slice(&shipped).map_err(|e| Stage::ShipmentDecode.fail(e))?;

        if shipment.step_error.is_fault() {
            tracing::warn!(
                error_type = %shipment.step_error.error_type,
                request_id = %shipment.step_error.request_id,
                error_message = %shipment.step_error.error_message,
                "shipment step faulted"
            );
            return Err(Stage::ShipmentFault.fail(shipment.step_error.joined_trace()));
        }
        if shipment.status_code != crate::order_fulfillment::STATUS_OK {
            return Err(Stage::ShipmentStatus.fail(&shipment.body));
        }
        saga.advance(SagaState::Shipped)?;
        saga.complete_step(
            Stage::Shipment,
            Some(Compensation::new(STEP_CANCEL_SHIPMENT, shipped.clone())),
        );

        // 9. Persist shipment
        let shipment_record = fields([
            ("OrderId", order_id),
            ("CardNumber", charge.payment.card_number.as_str()),
            (
                "ChargeTimeStamp",
                charge.payment.charge_customer_timestamp.as_str(),
            ),
            ("Currency", charge.order.order_total.currency_code.as_str()),
        ]);
        self.persist(
            Stage::PersistShipment,
            &self.config.collections.shipment_history,
            order_id,
            shipment_record,
        )
        .await?;
        saga.complete_step(Stage::PersistShipment, None);
        saga.advance(SagaState::ShipmentPersisted)?;

        // 10. Announce shipment
        self.announce(
            Stage::NotifyShipment,
            &self.config.topics.order_shipment,
            &shipped,
        )
        .await?;
        saga.complete_step(Stage::NotifyShipment, None);
        saga.advance(SagaState::ShipmentNotified)?;

        // 11. Complete
        saga.complete()?;
        Ok(SagaResult::Completed { payload: shipped })
    }

    /// Invokes the charge step, re-checking a pending charge as configured.
    async fn charge(
        &self,
        saga: &mut SagaInstance,
        input: &[u8],
    ) -> Result<ChargeDecision, SagaError> {
        let mut rechecks = 0;
        loop {
            saga.advance(SagaState::Charging)?;
            let payload = self
                .invoke_step(Stage::Charge, STEP_CHARGE_CUSTOMER, input.to_vec())
                .await?;
            let response: CreateOrderResponse =
                serde_json::from_slice(&payload).map_err(|e| Stage::ChargeDecode.fail(e))?;

            let status = response.payment_status().clone();
            match status {
                PaymentStatus::Paid => {
                    saga.advance(SagaState::ChargedPaid)?;
                    saga.complete_step(
                        Stage::Charge,
                        Some(Compensation::new(STEP_REFUND_CUSTOMER, payload.clone())),
                    );
                    return Ok(ChargeDecision::Paid { payload, response });
                }
                PaymentStatus::Pending => {
                    saga.advance(SagaState::ChargedPending)?;
                    if rechecks >= self.config.pending.max_rechecks {
                        tracing::info!(rechecks, "chargeCustomer pending, retry later");
                        return Ok(ChargeDecision::Pending { payload });
                    }
                    rechecks += 1;
                    tracing::debug!(rechecks, "chargeCustomer pending, re-checking");
                    tokio::time::sleep(self.config.pending.recheck_delay).await;
                }
                PaymentStatus::Other(status) => {
                    saga.advance(SagaState::ChargedFailed)?;
                    tracing::warn!(payment_status = %status, "chargeCustomer reported unpaid status");
                    return Err(
                        Stage::ChargeStatus.fail(format!("Payment status '{status}' is not payable"))
                    );
                }
            }
        }
    }

    /// Invokes a step and rejects any status other than 200.
    async fn invoke_step(
        &self,
        stage: Stage,
        step: &str,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, SagaError> {
        tracing::info!(step, "saga step started");
        let started = Instant::now();
        let output = self.invoker.invoke(step, payload).await;
        metrics::histogram!("saga_step_duration_seconds", "step" => step.to_string())
            .record(started.elapsed().as_secs_f64());

        let output = output.map_err(|e| stage.fail(e))?;
        if !output.is_ok() {
            return Err(stage.fail(format!(
                "Something went wrong with status code {}",
                output.status_code
            )));
        }
        Ok(output.payload)
    }

    async fn announce(&self, stage: Stage, topic: &str, message: &[u8]) -> Result<(), SagaError> {
        let message_id = self
            .publisher
            .publish(topic, message)
            .await
            .map_err(|e| stage.fail(e))?;
        tracing::info!(topic, %message_id, "fulfillment event published");
        Ok(())
    }

    async fn persist(
        &self,
        stage: Stage,
        collection: &str,
        order_id: &str,
        record: ledger::LedgerFields,
    ) -> Result<(), SagaError> {
        self.ledger
            .put(collection, order_id, record)
            .await
            .map_err(|e| stage.fail(SagaError::from(e)))?;
        tracing::debug!(collection, "ledger record written");
        Ok(())
    }

    /// Stops the saga, compensating first when the policy allows it.
    async fn abort(&self, saga: &mut SagaInstance, error: &SagaError) {
        let stage_name = error.stage().map_or("request", |stage| stage.name());
        if let Some(stage) = error.stage() {
            saga.apply(SagaEvent::step_failed(stage, error.reason()));
        }

        if self.config.compensation.is_enabled() && !saga.compensations().is_empty() {
            self.compensate(saga).await;
        }

        if let Err(e) = saga.advance(SagaState::Aborted) {
            tracing::error!(error = %e, "saga could not be marked aborted");
        }

        metrics::counter!("saga_failed", "stage" => stage_name).increment(1);
        tracing::warn!(stage = stage_name, error = %error, "saga aborted");
    }

    /// Runs recorded compensations in reverse order of completion.
    ///
    /// A failed compensation is recorded and the remaining ones still run.
    #[tracing::instrument(skip(self, saga))]
    async fn compensate(&self, saga: &mut SagaInstance) {
        let from_stage = saga.failure().map_or(Stage::Payload, |(stage, _)| stage);
        saga.apply(SagaEvent::compensation_started(from_stage));

        let compensations: Vec<(Stage, Compensation)> =
            saga.compensations().iter().rev().cloned().collect();
        for (stage, compensation) in compensations {
            metrics::counter!("saga_compensations_total", "step" => compensation.step.clone())
                .increment(1);

            let event = match self
                .invoker
                .invoke(&compensation.step, compensation.payload)
                .await
            {
                Ok(output) if output.is_ok() => SagaEvent::compensation_step_completed(stage),
                Ok(output) => SagaEvent::compensation_step_failed(
                    stage,
                    format!("status code {}", output.status_code),
                ),
                Err(e) => SagaEvent::compensation_step_failed(stage, e.to_string()),
            };

            if let SagaEvent::CompensationStepFailed(data) = &event {
                tracing::error!(stage = %stage, error = %data.error, "compensation step failed");
            }
            saga.apply(event);
        }

        tracing::info!(
            compensated = saga.compensated_steps().len(),
            recorded = saga.compensations().len(),
            "compensation finished"
        );
    }
}
