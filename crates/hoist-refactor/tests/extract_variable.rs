// Integration tests for the extract-variable tweak, consolidated into one test binary.

mod suite;
