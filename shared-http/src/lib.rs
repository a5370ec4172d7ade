pub mod api {
    mod requests;
    mod responses;

    pub use requests::*;
    pub use responses::*;
}
