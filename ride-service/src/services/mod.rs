pub mod distance;
pub mod fare;
pub mod matching;
pub mod notification;
pub mod payment;
pub mod rating;
pub mod rides;
pub mod wallet;

pub use distance::{DistanceEstimator, EstimatorClient, RouteEstimate};
pub use fare::{DistanceTimeFareStrategy, FareCalculator, FareStrategy};
pub use matching::{
    DriverMatcher, HighestRatedDriverStrategy, MatchingStrategy, NearestDriverStrategy,
};
pub use notification::{NotificationSink, TracingNotifier};
pub use payment::{CashPaymentStrategy, PaymentService, PaymentStrategy, WalletPaymentStrategy};
pub use rating::RatingService;
pub use rides::RideService;
pub use wallet::WalletService;
