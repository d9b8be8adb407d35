mod calendar_mock;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Configuration, component wiring and formatting basics
// - calendar_mock: The calendar scheduler against a mocked event source
// - btt_mock: The BetterTouchTool client against a mocked web server
