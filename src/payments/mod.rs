mod paddle;

pub use paddle::{
    PaddleClient, PaddleCustomer, PaddleSubscriptionData, PaddleTransaction, PaddleWebhookEvent,
};
