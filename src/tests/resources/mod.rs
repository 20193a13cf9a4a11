mod allocation_tests;
mod power_tests;
mod provisioning_tests;
mod teardown_tests;
