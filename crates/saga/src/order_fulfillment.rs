//! Order fulfillment saga constants.

/// The saga type identifier for order fulfillment.
pub const SAGA_TYPE: &str = "OrderFulfillment";

/// Remote step: validate the submitted order.
pub const STEP_VALIDATE_ORDER: &str = "validateOrder";

/// Remote step: charge the customer.
pub const STEP_CHARGE_CUSTOMER: &str = "chargeCustomer";

/// Remote step: start the shipment.
pub const STEP_SHIPMENT: &str = "shipment";

/// Remote step: refund a completed charge.
pub const STEP_REFUND_CUSTOMER: &str = "refundCustomer";

/// Remote step: cancel a started shipment.
pub const STEP_CANCEL_SHIPMENT: &str = "cancelShipment";

/// Status code every remote step reports on success.
pub const STATUS_OK: i32 = 200;

pub const TOPIC_ORDER_CREATION: &str = "OrderCreation";
pub const TOPIC_ORDER_PAYMENT: &str = "OrderPayment";
pub const TOPIC_ORDER_SHIPMENT: &str = "OrderShipment";

pub const COLLECTION_BILL_HISTORY: &str = "CustomerBillHistoryTable";
pub const COLLECTION_SHIPMENT_HISTORY: &str = "ShipmentHistoryTable";

/// Collection holding inventory records keyed by item ID.
pub const COLLECTION_INVENTORY: &str = "Inventory";
