//! Integration tests for the rendezvous API and the presence agent.

mod helpers;

mod agent_test;
mod presence_test;
mod rate_limit_test;
mod room_test;
