//! Column names of the order-fact table.

pub const ORDER_ID: &str = "order_id";
pub const ORDER_ITEM_ID: &str = "order_item_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const CUSTOMER_UNIQUE_ID: &str = "customer_unique_id";
pub const PRODUCT_ID: &str = "product_id";
pub const SELLER_ID: &str = "seller_id";
pub const CUSTOMER_STATE: &str = "customer_state";
pub const CUSTOMER_CITY: &str = "customer_city";
pub const CUSTOMER_ZIP_CODE_PREFIX: &str = "customer_zip_code_prefix";
pub const ORDER_STATUS: &str = "order_status";
pub const PRICE: &str = "price";
pub const FREIGHT_VALUE: &str = "freight_value";
pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const ORDER_DELIVERED_CARRIER_DATE: &str = "order_delivered_carrier_date";
pub const ORDER_DELIVERED_CUSTOMER_DATE: &str = "order_delivered_customer_date";
pub const ORDER_ESTIMATED_DELIVERY_DATE: &str = "order_estimated_delivery_date";
pub const SHIPPING_LIMIT_DATE: &str = "shipping_limit_date";
