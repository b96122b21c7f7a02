pub mod ask_request;
pub mod ask_response;
pub mod ask_route;
